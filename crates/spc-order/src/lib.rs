//! The `Order` lifecycle: advances a [`StageGraph`] toward completion and
//! mediates repair when a node has failed, consulting the [`Enumerator`]
//! for alternative subtrees over a [`Catalog`] (§4.5).

pub mod stage_graph;

pub use stage_graph::{StageGraph, Status};

use std::collections::HashSet;

use thiserror::Error;

use spc_core::{Atom, Catalog};
use spc_enum::{Enumerator, SupplyTree};

#[derive(Error, Debug, PartialEq)]
pub enum OrderError {
    #[error("no stage graph node named '{0}'")]
    NodeNotFound(String),

    #[error("no complete subtree exists for '{0}' over the given catalog")]
    RepairInfeasible(String),
}

/// A repair intent: the supply/maker name being scratched, and the name of
/// the replacement that was found for it. `replacement` is the candidate a
/// caller saw via [`Order::find_substitutions`]; `repair_by` does not use
/// it to pick among several candidates (see its doc) — it is audit
/// metadata, same as the original reference's `SubstSupply` pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub scratched: String,
    pub replacement: String,
}

/// Drives a single [`StageGraph`] toward completion.
pub struct Order {
    pub good: Atom,
    pub stage_graph: StageGraph,
}

impl Order {
    pub fn new(good: Atom, stage_graph: StageGraph) -> Self {
        Self { good, stage_graph }
    }

    /// Builds an order from a complete `SupplyTree`. `None` if the tree is
    /// incomplete (mirrors [`StageGraph::from_tree`]).
    pub fn from_tree(good: Atom, tree: &SupplyTree) -> Option<Self> {
        Some(Self::new(good, StageGraph::from_tree(tree)?))
    }

    /// Finds the deepest `Open` node (post-order), marks it `Succeeded`,
    /// and returns a copy of it. `None` once no `Open` node remains — this
    /// is the normal end-of-work signal, not an error (§7).
    pub fn advance_one(&mut self) -> Option<StageGraph> {
        self.stage_graph.advance_deepest_open()
    }

    /// For every currently `Failed` node, enumerates complete subtrees for
    /// its `good` over `catalog`, producing one substitution per complete
    /// subtree found.
    pub fn find_substitutions(&self, catalog: &Catalog) -> Vec<Substitution> {
        find_substitutions_for(&self.stage_graph, catalog)
    }

    /// Applies a single repair: locates the node named `sub.scratched`,
    /// enumerates complete subtrees rooted at that node's `good` over
    /// `catalog`, and repairs with the first one found in enumeration
    /// order (ordering determinism, §4.2). This mirrors the reference's
    /// `applySub`, which always takes its first candidate and only warns
    /// when more than one exists — `sub.replacement` records which
    /// candidate a caller observed via `find_substitutions`, it is not
    /// consulted to pick a specific one here.
    pub fn repair_by(&mut self, sub: &Substitution, catalog: &Catalog) -> Result<(), OrderError> {
        repair_by_on(&mut self.stage_graph, sub, catalog)
    }
}

fn find_substitutions_for(stage_graph: &StageGraph, catalog: &Catalog) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for name in stage_graph.names_of_failed() {
        let Some(good) = stage_graph.find_by_name(&name).map(|n| n.good.clone()) else {
            continue;
        };
        let mut any = false;
        for tree in Enumerator::new(catalog).enumerate(&good) {
            if !tree.is_complete() {
                continue;
            }
            if let Some(replacement) = tree.supply_name() {
                any = true;
                subs.push(Substitution {
                    scratched: name.clone(),
                    replacement: replacement.to_string(),
                });
            }
        }
        if !any {
            tracing::warn!(name = %name, "find_substitutions found no repair candidate");
        }
    }
    subs
}

fn repair_by_on(
    stage_graph: &mut StageGraph,
    sub: &Substitution,
    catalog: &Catalog,
) -> Result<(), OrderError> {
    let good = stage_graph
        .find_by_name(&sub.scratched)
        .map(|n| n.good.clone())
        .ok_or_else(|| OrderError::NodeNotFound(sub.scratched.clone()))?;

    let chosen = Enumerator::new(catalog)
        .enumerate(&good)
        .find(SupplyTree::is_complete)
        .ok_or_else(|| OrderError::RepairInfeasible(sub.scratched.clone()))?;

    stage_graph.repair(&sub.scratched, &chosen);
    tracing::info!(scratched = %sub.scratched, replacement = %sub.replacement, "applied repair");
    Ok(())
}

/// For every supply/maker name present in `network` (every party and
/// design name), marks the matching node `Failed` in every graph in
/// `stage_graphs`. Used to simulate the entire loss of a sub-network `A`
/// within a combined network `A ∪ B` (§4.5). Driven as a plain loop over
/// names and graphs rather than recursing across the list — the only
/// recursion here is `StageGraph::scratch`'s own per-node walk, bounded by
/// a single tree's depth exactly like the rest of the stack (§9).
pub fn scratch_all(stage_graphs: &mut [StageGraph], network: &Catalog) {
    let names: Vec<&str> = network_supply_names(network);
    for sg in stage_graphs.iter_mut() {
        for name in &names {
            sg.scratch(name);
        }
    }
}

/// For each graph, finds and applies one repair per distinct `Failed` name
/// (the first complete subtree `find_substitutions` reports for that
/// name). Property (§8, property 7): for bifurcated networks `A ⊔ B = C`,
/// `repair_all(scratch_all(StageGraphs(T_C), A), A)` has the same
/// cardinality as `T_C` — this holds because the call is a 1:1 `map` over
/// the input graphs and every `Failed` node introduced by `scratch_all`
/// against `A` is repairable from `A` itself.
pub fn repair_all(stage_graphs: &[StageGraph], network: &Catalog) -> Vec<StageGraph> {
    stage_graphs
        .iter()
        .map(|sg| {
            let mut sg = sg.clone();
            let mut seen = HashSet::new();
            for sub in find_substitutions_for(&sg, network) {
                if seen.insert(sub.scratched.clone()) {
                    if let Err(err) = repair_by_on(&mut sg, &sub, network) {
                        tracing::warn!(scratched = %sub.scratched, %err, "repair_all could not repair node");
                    }
                }
            }
            sg
        })
        .collect()
}

fn network_supply_names(network: &Catalog) -> Vec<&str> {
    network
        .parties()
        .iter()
        .map(|p| p.name.as_str())
        .chain(network.designs().iter().map(|d| d.name.as_str()))
        .collect()
}
