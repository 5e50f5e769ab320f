use anyhow::Result;

use spc_enum::SupplyTree;

/// Renders a single supply tree in either `"json"` (the stable wire format
/// of §6, the default) or `"text"` (the indented `Display` rendering of
/// §11, for humans reading at a terminal).
pub fn render(tree: &SupplyTree, format: &str) -> Result<String> {
    match format {
        "text" => Ok(tree.to_string().trim_end().to_string()),
        _ => Ok(serde_json::to_string(tree)?),
    }
}
