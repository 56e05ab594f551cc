use anyhow::Context;
use serde_json::Value;
use std::path::Path;

use super::types::HyperSchema;

/// Load a hyper-schema document from disk
///
/// Files ending in `.yaml`/`.yml` are read as YAML, everything else as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_schema(path: &Path) -> anyhow::Result<HyperSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {:?}", path))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    parse_schema_str(&content, is_yaml).with_context(|| format!("Failed to parse schema {:?}", path))
}

/// Decode a hyper-schema document from a string
///
/// # Errors
///
/// Returns an error if the content is not valid JSON/YAML or not a
/// hyper-schema object.
pub fn parse_schema_str(content: &str, yaml: bool) -> anyhow::Result<HyperSchema> {
    let value: Value = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    HyperSchema::from_value(value)
}
