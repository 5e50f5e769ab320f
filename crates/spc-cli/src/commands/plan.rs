use std::process::ExitCode;

use anyhow::Result;

use spc_core::{Atom, Catalog};
use spc_enum::Enumerator;

use crate::output;

/// Enumerates every supply tree for `product` and prints one per line.
/// Exit code `2` when not a single complete tree exists — the §6 "product
/// not found" case, whether because nothing supplies it at all or every
/// combination bottoms out in a `Missing` leaf somewhere.
pub fn execute(catalog: &Catalog, product: &str, format: &str) -> Result<ExitCode> {
    let target = Atom::id(product);
    let mut saw_any = false;
    let mut saw_complete = false;

    for tree in Enumerator::new(catalog).enumerate(&target) {
        saw_any = true;
        saw_complete |= tree.is_complete();
        println!("{}", output::render(&tree, format)?);
    }

    if !saw_any || !saw_complete {
        tracing::warn!(product, "plan: no complete supply tree found");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
