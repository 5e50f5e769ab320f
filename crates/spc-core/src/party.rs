use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::atom::Atom;

/// An entity that can supply atoms from outside, hold inventory on hand, or
/// own the tools needed to execute a design. A party with empty `tools` can
/// never act as a maker, regardless of what it supplies or stocks.
///
/// Equality and hashing are on `name` alone — parties are unique by name
/// within a catalog, the same as designs (§9 redesign).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub supplies: BTreeSet<Atom>,
    pub tools: BTreeSet<Atom>,
    pub inventory: BTreeSet<Atom>,
}

impl Party {
    pub fn new(
        name: impl Into<String>,
        supplies: impl IntoIterator<Item = Atom>,
        tools: impl IntoIterator<Item = Atom>,
        inventory: impl IntoIterator<Item = Atom>,
    ) -> Self {
        Self {
            name: name.into(),
            supplies: supplies.into_iter().collect(),
            tools: tools.into_iter().collect(),
            inventory: inventory.into_iter().collect(),
        }
    }

    /// Whether this party could act as a maker for a design needing `tools`.
    /// An empty tool requirement never has a compatible maker.
    pub fn has_tools_for(&self, tools: &BTreeSet<Atom>) -> bool {
        !tools.is_empty() && tools.is_subset(&self.tools)
    }
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Party {}

impl Hash for Party {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
