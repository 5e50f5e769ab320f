use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use spc_core::{Atom, Design, Party};

/// The enumerator's output: a single resolved way of obtaining a product.
/// Trees are values — cheap to clone structurally since parties and
/// designs are held behind `Rc` and children live inside their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum SupplyTree {
    Supplied {
        product: Atom,
        supplier: Rc<Party>,
    },
    FromInventory {
        product: Atom,
        maker: Rc<Party>,
    },
    Made {
        product: Atom,
        design: Rc<Design>,
        maker: Rc<Party>,
        children: Rc<BTreeMap<Atom, SupplyTree>>,
    },
    Missing {
        product: Atom,
    },
}

impl SupplyTree {
    pub fn product(&self) -> &Atom {
        match self {
            SupplyTree::Supplied { product, .. }
            | SupplyTree::FromInventory { product, .. }
            | SupplyTree::Made { product, .. }
            | SupplyTree::Missing { product } => product,
        }
    }

    /// The name serialized as `current_supply_name` when this node becomes
    /// part of a `StageGraph`: the supplier/maker name for a leaf, the
    /// recipe name for a `Made` node. `Missing` has no such name since an
    /// incomplete tree cannot be staged.
    pub fn supply_name(&self) -> Option<&str> {
        match self {
            SupplyTree::Supplied { supplier, .. } => Some(&supplier.name),
            SupplyTree::FromInventory { maker, .. } => Some(&maker.name),
            SupplyTree::Made { design, .. } => Some(&design.name),
            SupplyTree::Missing { .. } => None,
        }
    }

    /// Every `Missing` atom reachable from this tree, in pre-order.
    pub fn missing_atoms(&self) -> Vec<Atom> {
        match self {
            SupplyTree::Missing { product } => vec![product.clone()],
            SupplyTree::Made { children, .. } => {
                children.values().flat_map(SupplyTree::missing_atoms).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_atoms().is_empty()
    }

    /// Every `Made` node's children cover exactly its design's bom, and
    /// every child's declared product matches its bom key (§4.2).
    pub fn is_consistent(&self) -> bool {
        match self {
            SupplyTree::Made {
                design, children, ..
            } => {
                let keys: std::collections::BTreeSet<&Atom> = children.keys().collect();
                let bom: std::collections::BTreeSet<&Atom> = design.bom.iter().collect();
                if keys != bom {
                    return false;
                }
                children
                    .iter()
                    .all(|(atom, child)| child.product() == atom && child.is_consistent())
            }
            _ => true,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SupplyTree::Supplied { product, supplier } => serde_json::json!({
                "product": product.to_json(),
                "type": "supplied",
                "party": supplier.name,
            }),
            SupplyTree::FromInventory { product, maker } => serde_json::json!({
                "product": product.to_json(),
                "type": "inventory",
                // the reference dereferences a nonexistent `supplier` field here;
                // the correct source is the maker (§9).
                "party": maker.name,
            }),
            SupplyTree::Made {
                product,
                design,
                maker,
                children,
            } => serde_json::json!({
                "product": product.to_json(),
                "type": "made",
                "party": maker.name,
                "design": design.name,
                "bom": children.values().map(SupplyTree::to_json).collect::<Vec<_>>(),
            }),
            SupplyTree::Missing { product } => serde_json::json!({
                "product": product.to_json(),
                "type": "missing",
            }),
        }
    }
}

impl Serialize for SupplyTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for SupplyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_indented(tree: &SupplyTree, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            let pad = "  ".repeat(depth);
            match tree {
                SupplyTree::Supplied { product, supplier } => {
                    writeln!(f, "{pad}{} <- supplied by {}", product.identifier, supplier.name)
                }
                SupplyTree::FromInventory { product, maker } => {
                    writeln!(f, "{pad}{} <- inventory at {}", product.identifier, maker.name)
                }
                SupplyTree::Made {
                    product,
                    design,
                    maker,
                    children,
                } => {
                    writeln!(
                        f,
                        "{pad}{} <- made via {} by {}",
                        product.identifier, design.name, maker.name
                    )?;
                    for child in children.values() {
                        write_indented(child, f, depth + 1)?;
                    }
                    Ok(())
                }
                SupplyTree::Missing { product } => writeln!(f, "{pad}{} <- MISSING", product.identifier),
            }
        }
        write_indented(self, f, 0)
    }
}
