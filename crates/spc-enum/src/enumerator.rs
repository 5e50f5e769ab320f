use std::collections::BTreeMap;
use std::rc::Rc;

use spc_core::{Atom, Catalog, Design, Party};

use crate::tree::SupplyTree;

/// Produces lazy sequences of [`SupplyTree`] for a requested product over a
/// [`Catalog`]. A fresh [`SupplyIter`] is created for every `enumerate`
/// call and for every recursive descent into a bom atom; none of them touch
/// shared mutable state (§5).
pub struct Enumerator<'c> {
    catalog: &'c Catalog,
}

impl<'c> Enumerator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn enumerate(&self, product: &Atom) -> SupplyIter<'c> {
        SupplyIter::new(self.catalog, product.clone(), Vec::new())
    }
}

/// The enumerator's explicit iterator state for a single atom: an OR over
/// suppliers, then an OR over (design, maker) pairs, each driving an
/// [`MadeIter`] AND-over-bom Cartesian product, finally falling back to a
/// single `Missing` if nothing else was ever emitted. No step recurses
/// through a call stack that outlives a single `next()` call — the whole
/// pending computation lives in this struct's fields (and, transitively,
/// the fields of the `MadeIter`s and child `SupplyIter`s it owns).
pub struct SupplyIter<'c> {
    catalog: &'c Catalog,
    product: Atom,
    cycle: bool,
    cycle_emitted: bool,
    supplier_idx: usize,
    design_idx: usize,
    maker_idx: usize,
    current_made: Option<Box<MadeIter<'c>>>,
    emitted_any: bool,
    fallback_emitted: bool,
    /// Atoms currently under expansion in ancestor frames, for cycle
    /// detection (§4.2 failure model). Does not include `product` itself.
    path: Vec<String>,
}

impl<'c> SupplyIter<'c> {
    fn new(catalog: &'c Catalog, product: Atom, path: Vec<String>) -> Self {
        let cycle = path.iter().any(|a| *a == product.identifier);
        Self {
            catalog,
            product,
            cycle,
            cycle_emitted: false,
            supplier_idx: 0,
            design_idx: 0,
            maker_idx: 0,
            current_made: None,
            emitted_any: false,
            fallback_emitted: false,
            path,
        }
    }
}

impl<'c> Iterator for SupplyIter<'c> {
    type Item = SupplyTree;

    fn next(&mut self) -> Option<SupplyTree> {
        if self.cycle {
            if self.cycle_emitted {
                return None;
            }
            self.cycle_emitted = true;
            tracing::debug!(atom = %self.product.identifier, "atom already on expansion path, short-circuiting");
            return Some(SupplyTree::Missing {
                product: self.product.clone(),
            });
        }

        while self.supplier_idx < self.catalog.parties().len() {
            let party = self.catalog.parties()[self.supplier_idx].clone();
            self.supplier_idx += 1;
            if party.supplies.contains(&self.product) {
                self.emitted_any = true;
                return Some(SupplyTree::Supplied {
                    product: self.product.clone(),
                    supplier: party,
                });
            }
        }

        loop {
            if let Some(made) = self.current_made.as_mut() {
                if let Some(tree) = made.next() {
                    self.emitted_any = true;
                    return Some(tree);
                }
                self.current_made = None;
                self.maker_idx += 1;
            }

            let designs = self.catalog.designs();
            let parties = self.catalog.parties();
            let mut found = false;
            while self.design_idx < designs.len() {
                let design = designs[self.design_idx].clone();
                if design.product != self.product {
                    self.design_idx += 1;
                    self.maker_idx = 0;
                    continue;
                }
                let mut set = false;
                while self.maker_idx < parties.len() {
                    let maker = parties[self.maker_idx].clone();
                    if maker.has_tools_for(&design.tools) {
                        let mut child_path = self.path.clone();
                        child_path.push(self.product.identifier.clone());
                        self.current_made = Some(Box::new(MadeIter::new(
                            self.catalog,
                            design,
                            maker,
                            child_path,
                        )));
                        set = true;
                        found = true;
                        break;
                    }
                    self.maker_idx += 1;
                }
                if set {
                    break;
                }
                self.design_idx += 1;
                self.maker_idx = 0;
            }
            if !found {
                break;
            }
        }

        if !self.emitted_any && !self.fallback_emitted {
            self.fallback_emitted = true;
            tracing::debug!(atom = %self.product.identifier, "no supplier or compatible maker, emitting missing");
            return Some(SupplyTree::Missing {
                product: self.product.clone(),
            });
        }
        None
    }
}

/// The AND-over-bom Cartesian product engine for one `(design, maker)`
/// pair: a frame holding one [`ChildSlot`] per bom atom, advanced
/// odometer-style (rightmost slot first, rolling over leftward).
struct MadeIter<'c> {
    catalog: &'c Catalog,
    product: Atom,
    design: Rc<Design>,
    maker: Rc<Party>,
    path: Vec<String>,
    slots: Vec<ChildSlot<'c>>,
    started: bool,
    exhausted: bool,
}

impl<'c> MadeIter<'c> {
    fn new(catalog: &'c Catalog, design: Rc<Design>, maker: Rc<Party>, path: Vec<String>) -> Self {
        let product = design.product.clone();
        // Each slot pulls its own first value as part of construction, so a
        // slot either exists with a real `current` tree already latched, or
        // it doesn't exist at all — there is no representable "not pulled
        // yet" state to panic on later.
        let slots: Option<Vec<ChildSlot<'c>>> = design
            .bom
            .iter()
            .cloned()
            .map(|atom| ChildSlot::new(catalog, atom, &maker, &path))
            .collect();
        let exhausted = slots.is_none();
        Self {
            catalog,
            product,
            design,
            maker,
            path,
            slots: slots.unwrap_or_default(),
            started: false,
            exhausted,
        }
    }

    fn materialize(&self) -> SupplyTree {
        let children: BTreeMap<Atom, SupplyTree> = self
            .slots
            .iter()
            .map(|slot| (slot.atom.clone(), slot.current.clone()))
            .collect();
        SupplyTree::Made {
            product: self.product.clone(),
            design: self.design.clone(),
            maker: self.maker.clone(),
            children: Rc::new(children),
        }
    }
}

impl<'c> Iterator for MadeIter<'c> {
    type Item = SupplyTree;

    fn next(&mut self) -> Option<SupplyTree> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.materialize());
        }

        let mut i = self.slots.len();
        loop {
            if i == 0 {
                self.exhausted = true;
                return None;
            }
            i -= 1;
            if self.slots[i].advance() {
                let mut ok = true;
                for slot in &mut self.slots[(i + 1)..] {
                    if !slot.reset(self.catalog, &self.path) {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    return Some(self.materialize());
                }
                // a downstream slot's deterministic replay came up empty,
                // which the determinism invariant (§8) says cannot happen;
                // treat this odometer position as a dead end rather than
                // panicking, and keep rolling left.
                continue;
            }
            if !self.slots[i].reset(self.catalog, &self.path) {
                self.exhausted = true;
                return None;
            }
        }
    }
}

/// A single bom position's choice set: either the fixed singleton
/// `FromInventory` choice, or a full recursive enumeration. `current`
/// always holds a real value for the lifetime of the slot — a slot that
/// cannot produce one is never constructed.
struct ChildSlot<'c> {
    atom: Atom,
    source: ChildSource<'c>,
    current: SupplyTree,
}

enum ChildSource<'c> {
    Inventory(Rc<Party>),
    Enumerated(Box<SupplyIter<'c>>),
}

impl<'c> ChildSlot<'c> {
    /// `None` if this bom position has no possible supply at all (an
    /// enumerated source that is immediately exhausted).
    fn new(catalog: &'c Catalog, atom: Atom, maker: &Rc<Party>, path: &[String]) -> Option<Self> {
        if maker.inventory.contains(&atom) {
            let current = SupplyTree::FromInventory {
                product: atom.clone(),
                maker: maker.clone(),
            };
            Some(Self {
                atom,
                source: ChildSource::Inventory(maker.clone()),
                current,
            })
        } else {
            let mut iter = Box::new(SupplyIter::new(catalog, atom.clone(), path.to_vec()));
            let current = iter.next()?;
            Some(Self {
                atom,
                source: ChildSource::Enumerated(iter),
                current,
            })
        }
    }

    /// Advances this slot's own sequence by one step. `Inventory` slots
    /// have exactly one value and never advance past it.
    fn advance(&mut self) -> bool {
        match &mut self.source {
            ChildSource::Inventory(_) => false,
            ChildSource::Enumerated(iter) => match iter.next() {
                Some(t) => {
                    self.current = t;
                    true
                }
                None => false,
            },
        }
    }

    /// Rolls this slot back to its first value, recreating the recursive
    /// iterator from scratch (it carries no external state, so replaying
    /// it reproduces the same sequence — determinism, §8 invariant 1).
    /// Returns `false` if that replay unexpectedly comes up empty.
    fn reset(&mut self, catalog: &'c Catalog, path: &[String]) -> bool {
        match &mut self.source {
            ChildSource::Inventory(maker) => {
                self.current = SupplyTree::FromInventory {
                    product: self.atom.clone(),
                    maker: maker.clone(),
                };
                true
            }
            ChildSource::Enumerated(iter) => {
                *iter = Box::new(SupplyIter::new(catalog, self.atom.clone(), path.to_vec()));
                match iter.next() {
                    Some(t) => {
                        self.current = t;
                        true
                    }
                    None => false,
                }
            }
        }
    }
}
