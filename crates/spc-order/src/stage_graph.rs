use std::collections::BTreeMap;
use std::fmt;

use spc_core::Atom;
use spc_enum::SupplyTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Succeeded,
    Failed,
}

/// A mutable execution-state overlay of a [`SupplyTree`]: same shape, but
/// every node additionally carries a status and a repair audit trail.
/// Built once from a complete tree and then mutated in place by an
/// [`crate::order::Order`] as work completes or fails.
#[derive(Debug, Clone, PartialEq)]
pub struct StageGraph {
    pub current_supply_name: String,
    pub good: Atom,
    pub status: Status,
    pub children: BTreeMap<Atom, StageGraph>,
    pub repair_history: Vec<String>,
}

impl StageGraph {
    /// Builds a `StageGraph` from a complete `SupplyTree`. Returns `None`
    /// if any reachable node is `Missing` — an incomplete tree cannot be
    /// executed (§4.4).
    pub fn from_tree(tree: &SupplyTree) -> Option<StageGraph> {
        let current_supply_name = tree.supply_name()?.to_string();
        let good = tree.product().clone();
        let children = match tree {
            SupplyTree::Made { children, .. } => {
                let mut built = BTreeMap::new();
                for (atom, child) in children.iter() {
                    built.insert(atom.clone(), StageGraph::from_tree(child)?);
                }
                built
            }
            _ => BTreeMap::new(),
        };
        Some(StageGraph {
            current_supply_name,
            good,
            status: Status::Open,
            children,
            repair_history: Vec::new(),
        })
    }

    /// Sets the status of the first matching node, pre-order (self before
    /// children, children in atom-identifier order). Returns whether a
    /// node was found.
    pub fn assert_status(&mut self, supply_name: &str, status: Status) -> bool {
        if self.current_supply_name == supply_name {
            self.status = status;
            return true;
        }
        for child in self.children.values_mut() {
            if child.assert_status(supply_name, status) {
                return true;
            }
        }
        false
    }

    pub fn scratch(&mut self, supply_name: &str) -> bool {
        self.assert_status(supply_name, Status::Failed)
    }

    /// The root and every descendant are `Succeeded`.
    pub fn is_complete(&self) -> bool {
        self.status == Status::Succeeded && self.children.values().all(StageGraph::is_complete)
    }

    /// `true` if this node or any descendant is `Failed`.
    pub fn needs_repair(&self) -> bool {
        self.status == Status::Failed || self.children.values().any(StageGraph::needs_repair)
    }

    /// Pre-order collection of `Failed` node names. Does not descend into
    /// the children of a `Failed` node — failure is reported at the
    /// highest point, and anything below it is moot until repair (§4.4).
    pub fn names_of_failed(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_failed(&mut out);
        out
    }

    fn collect_failed(&self, out: &mut Vec<String>) {
        if self.status == Status::Failed {
            out.push(self.current_supply_name.clone());
            return;
        }
        for child in self.children.values() {
            child.collect_failed(out);
        }
    }

    /// Pre-order first match by `current_supply_name`.
    pub fn find_by_name(&self, supply_name: &str) -> Option<&StageGraph> {
        if self.current_supply_name == supply_name {
            return Some(self);
        }
        self.children.values().find_map(|c| c.find_by_name(supply_name))
    }

    fn find_by_name_mut(&mut self, supply_name: &str) -> Option<&mut StageGraph> {
        if self.current_supply_name == supply_name {
            return Some(self);
        }
        self.children.values_mut().find_map(|c| c.find_by_name_mut(supply_name))
    }

    /// Locates the node named `supply_name`, pushes its current name onto
    /// its own repair history, and replaces its identity and children from
    /// `new_subtree`, resetting its status to `Open`. Returns whether a
    /// node was found. `new_subtree` must be complete — an incomplete
    /// replacement is a programming error, not modeled here since the
    /// enumerator never hands one to a repair caller that filters on
    /// completeness first.
    pub fn repair(&mut self, supply_name: &str, new_subtree: &SupplyTree) -> bool {
        let Some(node) = self.find_by_name_mut(supply_name) else {
            return false;
        };
        let Some(replacement) = StageGraph::from_tree(new_subtree) else {
            return false;
        };
        node.repair_history.push(node.current_supply_name.clone());
        let history = std::mem::take(&mut node.repair_history);
        *node = replacement;
        node.repair_history = history;
        tracing::info!(supply_name, "repaired node");
        true
    }

    fn find_deepest_open_path(&self) -> Option<Vec<Atom>> {
        for (key, child) in self.children.iter() {
            if let Some(mut path) = child.find_deepest_open_path() {
                path.insert(0, key.clone());
                return Some(path);
            }
        }
        if self.status == Status::Open {
            Some(Vec::new())
        } else {
            None
        }
    }

    fn find_deepest_open_mut(&mut self) -> Option<&mut StageGraph> {
        let path = self.find_deepest_open_path()?;
        let mut node = self;
        for key in path {
            node = node.children.get_mut(&key)?;
        }
        Some(node)
    }

    pub(crate) fn advance_deepest_open(&mut self) -> Option<StageGraph> {
        let node = self.find_deepest_open_mut()?;
        node.status = Status::Succeeded;
        Some(node.clone())
    }
}

impl fmt::Display for StageGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_indented(sg: &StageGraph, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            let pad = "  ".repeat(depth);
            writeln!(f, "{pad}{} [{:?}]", sg.current_supply_name, sg.status)?;
            for child in sg.children.values() {
                write_indented(child, f, depth + 1)?;
            }
            Ok(())
        }
        write_indented(self, f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spc_core::Party;
    use std::rc::Rc;

    fn leaf(name: &str, product: &str) -> SupplyTree {
        SupplyTree::Supplied {
            product: Atom::id(product),
            supplier: Rc::new(Party::new(name, [Atom::id(product)], [], [])),
        }
    }

    #[test]
    fn missing_subtree_yields_no_stage_graph() {
        let tree = SupplyTree::Missing { product: Atom::id("x") };
        assert!(StageGraph::from_tree(&tree).is_none());
    }

    #[test]
    fn fresh_stage_graph_is_all_open() {
        let tree = leaf("Raw", "x");
        let sg = StageGraph::from_tree(&tree).unwrap();
        assert_eq!(sg.status, Status::Open);
        assert!(!sg.is_complete());
    }

    #[test]
    fn scratch_marks_failed_and_needs_repair() {
        let tree = leaf("Raw", "x");
        let mut sg = StageGraph::from_tree(&tree).unwrap();
        assert!(sg.scratch("Raw"));
        assert!(sg.needs_repair());
        assert_eq!(sg.names_of_failed(), vec!["Raw".to_string()]);
    }

    #[test]
    fn repair_resets_to_open_and_records_history() {
        let tree = leaf("Raw", "x");
        let mut sg = StageGraph::from_tree(&tree).unwrap();
        sg.scratch("Raw");
        let replacement = leaf("Raw2", "x");
        assert!(sg.repair("Raw", &replacement));
        assert_eq!(sg.status, Status::Open);
        assert_eq!(sg.current_supply_name, "Raw2");
        assert_eq!(sg.repair_history, vec!["Raw".to_string()]);
    }

    #[test]
    fn names_of_failed_does_not_descend_into_failed_subtrees() {
        let child = leaf("Leg", "leg");
        let design = spc_core::Design::new(
            "D",
            Atom::id("chair"),
            [Atom::id("leg")],
            [Atom::id("tool")],
            [],
            spc_core::Expression::konst(0),
        )
        .unwrap();
        let tree = SupplyTree::Made {
            product: Atom::id("chair"),
            design: Rc::new(design),
            maker: Rc::new(Party::new("J", [], [Atom::id("tool")], [])),
            children: Rc::new([(Atom::id("leg"), child)].into_iter().collect()),
        };
        let mut sg = StageGraph::from_tree(&tree).unwrap();
        sg.scratch("D");
        assert_eq!(sg.names_of_failed(), vec!["D".to_string()]);
    }
}
