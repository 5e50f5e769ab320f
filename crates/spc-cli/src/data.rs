//! Direct-JSON ingestion of a catalog file. This is the "thin,
//! direct-JSON-only harness" of §10.3 — the real OKH/OKW/YAML ingestion
//! collaborators described in §1 are out of scope and live elsewhere.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use spc_core::{Atom, Catalog, Design, Party};

use crate::expr_parse;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("an atom in {0} is missing its identifier")]
    MissingIdentifier(String),

    #[error("design '{0}' has a cost-expression that could not be parsed: {1}")]
    BadCostExpression(String, String),
}

#[derive(Debug, Deserialize)]
struct AtomRecord {
    identifier: Option<String>,
    #[serde(default)]
    description: String,
}

impl AtomRecord {
    fn into_atom(self, context: &str) -> Result<Atom, IngestionError> {
        let identifier = self
            .identifier
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IngestionError::MissingIdentifier(context.to_string()))?;
        Ok(Atom::new(identifier, self.description))
    }
}

#[derive(Debug, Deserialize)]
struct PartyRecord {
    title: String,
    #[serde(default, rename = "supply-atoms")]
    supply_atoms: Vec<AtomRecord>,
    #[serde(default, rename = "tool-list-atoms")]
    tool_list_atoms: Vec<AtomRecord>,
    #[serde(default, rename = "inventory-atoms")]
    inventory_atoms: Vec<AtomRecord>,
}

#[derive(Debug, Deserialize)]
struct DesignRecord {
    title: String,
    #[serde(rename = "product-atom")]
    product_atom: AtomRecord,
    #[serde(default, rename = "bom-atoms")]
    bom_atoms: Vec<AtomRecord>,
    #[serde(default, rename = "tool-list-atoms")]
    tool_list_atoms: Vec<AtomRecord>,
    #[serde(default, rename = "bom-output-atoms")]
    bom_output_atoms: Vec<AtomRecord>,
    #[serde(default, rename = "cost-expression")]
    cost_expression: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    parties: Vec<PartyRecord>,
    #[serde(default)]
    designs: Vec<DesignRecord>,
    #[serde(default)]
    prices: HashMap<String, Decimal>,
}

/// Loads and validates a catalog from a JSON file at `path`. Ingestion
/// errors (missing atom identifiers, unparseable cost expressions) and
/// catalog assembly errors (self-referential recipes, duplicate names) are
/// both surfaced here, before any planning is attempted (§7).
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog file {}", path.display()))?;
    let record: CatalogRecord = serde_json::from_str(&content)
        .with_context(|| format!("parsing catalog JSON in {}", path.display()))?;

    let mut parties = Vec::with_capacity(record.parties.len());
    for p in record.parties {
        parties.push(into_party(p)?);
    }

    let mut designs = Vec::with_capacity(record.designs.len());
    for d in record.designs {
        designs.push(into_design(d)?);
    }

    tracing::info!(
        party_count = parties.len(),
        design_count = designs.len(),
        path = %path.display(),
        "ingested catalog"
    );

    Ok(Catalog::try_new(parties, designs, record.prices)?)
}

fn into_party(record: PartyRecord) -> Result<Party> {
    let name = record.title;
    let supplies = atoms(record.supply_atoms, &name)?;
    let tools = atoms(record.tool_list_atoms, &name)?;
    let inventory = atoms(record.inventory_atoms, &name)?;
    Ok(Party::new(name, supplies, tools, inventory))
}

fn into_design(record: DesignRecord) -> Result<Design> {
    let name = record.title;
    let product = record.product_atom.into_atom(&name)?;
    let bom = atoms(record.bom_atoms, &name)?;
    let tools = atoms(record.tool_list_atoms, &name)?;
    let byproducts = atoms(record.bom_output_atoms, &name)?;
    let cost_expr = build_cost_expr(&name, record.cost_expression.as_deref())?;
    Ok(Design::new(name, product, bom, tools, byproducts, cost_expr)?)
}

fn atoms(records: Vec<AtomRecord>, context: &str) -> Result<Vec<Atom>, IngestionError> {
    records.into_iter().map(|r| r.into_atom(context)).collect()
}

/// Builds a design's `cost_expr` from its optional `cost-expression`
/// string, defaulting to a bare reference to the design's own intrinsic
/// symbol when none is given. The literal identifier `intrinsic` in the
/// string stands for that same symbol.
fn build_cost_expr(design_name: &str, expr_str: Option<&str>) -> Result<spc_core::Expression, IngestionError> {
    let intrinsic_symbol = Design::intrinsic_symbol_for(design_name);
    let intrinsic = spc_core::Expression::var(intrinsic_symbol.clone());
    match expr_str {
        None => Ok(intrinsic),
        Some(s) => {
            let parsed = expr_parse::parse(s)
                .map_err(|e| IngestionError::BadCostExpression(design_name.to_string(), e))?;
            Ok(parsed.subst("intrinsic", &intrinsic))
        }
    }
}
