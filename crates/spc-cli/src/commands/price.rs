use std::process::ExitCode;

use anyhow::Result;

use spc_calc::{optimum, price};
use spc_core::{Atom, Catalog};

use crate::output;

/// Prints the minimum-cost complete tree for `product` and its score.
/// Exit code `2` when no complete tree exists to price.
pub fn execute(catalog: &Catalog, product: &str, format: &str) -> Result<ExitCode> {
    let target = Atom::id(product);
    match optimum(&target, catalog, price)? {
        Some((tree, score)) => {
            println!("{}", output::render(&tree, format)?);
            println!("score: {score}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            tracing::warn!(product, "price: no complete supply tree found");
            Ok(ExitCode::from(2))
        }
    }
}
