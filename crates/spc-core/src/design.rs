use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::error::{DesignError, DesignResult};
use crate::expr::Expression;

/// A recipe: how `product` is made from `bom`, which tools are required,
/// and what it costs symbolically. `cost_expr`'s free variables are exactly
/// the identifiers in `bom` plus the design's own intrinsic-cost symbol
/// (see [`Design::intrinsic_symbol`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub name: String,
    pub product: Atom,
    pub bom: BTreeSet<Atom>,
    pub tools: BTreeSet<Atom>,
    pub byproducts: BTreeSet<Atom>,
    pub cost_expr: Expression,
}

impl Design {
    pub fn new(
        name: impl Into<String>,
        product: Atom,
        bom: impl IntoIterator<Item = Atom>,
        tools: impl IntoIterator<Item = Atom>,
        byproducts: impl IntoIterator<Item = Atom>,
        cost_expr: Expression,
    ) -> DesignResult<Self> {
        let name = name.into();
        let bom: BTreeSet<Atom> = bom.into_iter().collect();
        let byproducts: BTreeSet<Atom> = byproducts.into_iter().collect();

        if bom.contains(&product) {
            return Err(DesignError::ProductInBom {
                name,
                product: product.identifier,
            });
        }
        if let Some(overlap) = bom.intersection(&byproducts).next() {
            return Err(DesignError::BomByproductOverlap {
                name,
                atom: overlap.identifier.clone(),
            });
        }

        Ok(Self {
            name,
            product,
            bom,
            tools: tools.into_iter().collect(),
            byproducts,
            cost_expr,
        })
    }

    /// The cost-expression symbol standing in for this design's own,
    /// recipe-private fixed cost (distinct from any BOM atom's identifier).
    pub fn intrinsic_symbol(&self) -> String {
        Self::intrinsic_symbol_for(&self.name)
    }

    /// Same as [`Design::intrinsic_symbol`], usable before a `Design` is
    /// fully constructed (e.g. while an ingestion collaborator is still
    /// assembling one from a record).
    pub fn intrinsic_symbol_for(name: &str) -> String {
        format!("design:{name}:intrinsic")
    }
}

impl PartialEq for Design {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Design {}

impl Hash for Design {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
