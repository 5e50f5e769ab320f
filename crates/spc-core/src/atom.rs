use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The universal currency of the catalog: a product, a raw material, or a
/// tool. Identity is the `identifier` alone — `description` is metadata
/// that two otherwise-identical atoms are free to disagree on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    pub identifier: String,
    pub description: String,
}

impl Atom {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
        }
    }

    /// Shorthand for fixtures and tests where the description doesn't matter.
    pub fn id(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            description: identifier.clone(),
            identifier,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.identifier,
            "desc": self.description,
        })
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identifier.cmp(&other.identifier)
    }
}
