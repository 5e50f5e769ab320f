use rust_decimal::Decimal;
use thiserror::Error;

use spc_core::{Atom, Catalog, Expression};
use spc_enum::{Enumerator, SupplyTree};

#[derive(Error, Debug, PartialEq)]
pub enum CostError {
    #[error("cannot score an incomplete tree: '{0}' is missing")]
    IncompleteTree(String),

    #[error("no price entry for '{0}'")]
    UnknownPrice(String),
}

/// Composes a tree's symbolic cost expression: each leaf contributes a
/// variable named after its product identifier, and each `Made` node
/// substitutes its children's characteristic expressions into its design's
/// `cost_expr`. Scoring an incomplete tree is a programming error, not a
/// planning outcome (§7) — it returns `IncompleteTree` rather than
/// panicking so callers driving `optimum` over a mixed lazy sequence can
/// filter complete trees without crashing on the rest.
pub fn characteristic(tree: &SupplyTree) -> Result<Expression, CostError> {
    match tree {
        SupplyTree::Supplied { product, .. } | SupplyTree::FromInventory { product, .. } => {
            Ok(Expression::var(product.identifier.clone()))
        }
        SupplyTree::Made { design, children, .. } => {
            let mut expr = design.cost_expr.clone();
            for (atom, child) in children.iter() {
                let child_expr = characteristic(child)?;
                expr = expr.subst(&atom.identifier, &child_expr);
            }
            Ok(expr)
        }
        SupplyTree::Missing { product } => Err(CostError::IncompleteTree(product.identifier.clone())),
    }
}

/// Reduces a tree's characteristic expression to a number, resolving every
/// free variable from `catalog`'s price map.
pub fn price(tree: &SupplyTree, catalog: &Catalog) -> Result<Decimal, CostError> {
    let expr = characteristic(tree)?;
    let mut free = std::collections::BTreeSet::new();
    expr.free_vars(&mut free);

    let mut bindings = std::collections::HashMap::new();
    for name in free {
        let value = catalog
            .price_map()
            .get(&name)
            .copied()
            .ok_or_else(|| CostError::UnknownPrice(name.clone()))?;
        bindings.insert(name, value);
    }

    expr.eval(&bindings)
        .map_err(|e| CostError::UnknownPrice(e.to_string()))
}

/// Returns the minimum-scoring complete tree over every tree `enumerate`
/// produces for `product`, along with its score. Ties are broken by
/// enumeration order: the first tree seen with the minimum score wins.
///
/// The reference implementation this is modeled on returns the last tree
/// it iterated rather than the true minimum (it conflates the loop
/// variable with the tracked best); this keeps the minimizing tree and its
/// score in separate bindings so the bug cannot recur.
pub fn optimum<F>(
    product: &Atom,
    catalog: &Catalog,
    score_fn: F,
) -> Result<Option<(SupplyTree, Decimal)>, CostError>
where
    F: Fn(&SupplyTree, &Catalog) -> Result<Decimal, CostError>,
{
    let enumerator = Enumerator::new(catalog);
    let mut best: Option<(SupplyTree, Decimal)> = None;

    for tree in enumerator.enumerate(product) {
        if !tree.is_complete() {
            continue;
        }
        let score = score_fn(&tree, catalog)?;
        let better = match &best {
            None => true,
            Some((_, best_score)) => score < *best_score,
        };
        if better {
            best = Some((tree, score));
        }
    }

    if let Some((_, score)) = &best {
        tracing::info!(product = %product.identifier, %score, "found optimum");
    } else {
        tracing::warn!(product = %product.identifier, "no complete tree found for optimum");
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spc_core::{Design, Party};
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn chair_design(name: &str, intrinsic: &str) -> Design {
        let cost_expr = Expression::konst(dec(intrinsic))
            .add(Expression::konst(dec("4")).mul(Expression::var("leg")))
            .add(Expression::var("seat"))
            .add(Expression::var("back"));
        Design::new(
            name,
            Atom::id("chair"),
            [Atom::id("leg"), Atom::id("seat"), Atom::id("back")],
            [Atom::id("tool")],
            [],
            cost_expr,
        )
        .unwrap()
    }

    fn chair_catalog() -> Catalog {
        let parties = vec![
            Party::new("J", [], [Atom::id("tool")], []),
            Party::new("LegSupplier", [Atom::id("leg")], [], []),
            Party::new("SeatSupplier", [Atom::id("seat")], [], []),
            Party::new("BackSupplier", [Atom::id("back")], [], []),
        ];
        let designs = vec![chair_design("C1", "4"), chair_design("C2", "3")];
        let mut price_map = HashMap::new();
        price_map.insert("leg".to_string(), dec("1"));
        price_map.insert("seat".to_string(), dec("2"));
        price_map.insert("back".to_string(), dec("3"));
        Catalog::try_new(parties, designs, price_map).unwrap()
    }

    #[test]
    fn s5_optimum_over_price() {
        let catalog = chair_catalog();
        let (tree, score) = optimum(&Atom::id("chair"), &catalog, price).unwrap().unwrap();
        assert_eq!(score, dec("12"));
        match tree {
            SupplyTree::Made { design, .. } => assert_eq!(design.name, "C2"),
            other => panic!("expected Made, got {other:?}"),
        }
    }

    #[test]
    fn c1_prices_higher_than_c2() {
        let catalog = chair_catalog();
        let c1 = Design::new(
            "C1",
            Atom::id("chair"),
            [Atom::id("leg"), Atom::id("seat"), Atom::id("back")],
            [Atom::id("tool")],
            [],
            Expression::konst(dec("4"))
                .add(Expression::konst(dec("4")).mul(Expression::var("leg")))
                .add(Expression::var("seat"))
                .add(Expression::var("back")),
        )
        .unwrap();
        let tree = SupplyTree::Made {
            product: Atom::id("chair"),
            design: std::rc::Rc::new(c1),
            maker: catalog.parties()[0].clone(),
            children: std::rc::Rc::new(
                [
                    (
                        Atom::id("leg"),
                        SupplyTree::Supplied {
                            product: Atom::id("leg"),
                            supplier: catalog.parties()[1].clone(),
                        },
                    ),
                    (
                        Atom::id("seat"),
                        SupplyTree::Supplied {
                            product: Atom::id("seat"),
                            supplier: catalog.parties()[2].clone(),
                        },
                    ),
                    (
                        Atom::id("back"),
                        SupplyTree::Supplied {
                            product: Atom::id("back"),
                            supplier: catalog.parties()[3].clone(),
                        },
                    ),
                ]
                .into_iter()
                .collect(),
            ),
        };
        assert_eq!(price(&tree, &catalog).unwrap(), dec("13"));
    }

    #[test]
    fn scoring_an_incomplete_tree_is_an_error() {
        let catalog = chair_catalog();
        let tree = SupplyTree::Missing {
            product: Atom::id("chair"),
        };
        assert_eq!(
            price(&tree, &catalog),
            Err(CostError::IncompleteTree("chair".to_string()))
        );
    }

    #[test]
    fn unknown_price_is_an_error() {
        let catalog = Catalog::try_new(
            vec![Party::new("Raw", [Atom::id("x")], [], [])],
            vec![],
            HashMap::new(),
        )
        .unwrap();
        let tree = SupplyTree::Supplied {
            product: Atom::id("x"),
            supplier: catalog.parties()[0].clone(),
        };
        assert_eq!(price(&tree, &catalog), Err(CostError::UnknownPrice("x".to_string())));
    }
}
