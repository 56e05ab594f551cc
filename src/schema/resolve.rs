use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Resolve a single JSON `$ref` against the root document
///
/// Only document-local JSON pointer references are supported
/// (`#`, `#/definitions/item`, `#/$defs/item`).
///
/// # Errors
///
/// Returns [`SchemaError::UnresolvedRef`] for remote references and for
/// pointers that do not exist in the document.
pub fn resolve_schema_ref<'a>(root: &'a Value, reference: &str) -> Result<&'a Value, SchemaError> {
    let unresolved = || SchemaError::UnresolvedRef {
        reference: reference.to_string(),
    };
    let pointer = reference.strip_prefix('#').ok_or_else(unresolved)?;
    if pointer.is_empty() {
        return Ok(root);
    }
    root.pointer(pointer).ok_or_else(unresolved)
}

/// Recursively expand every `$ref` in `schema`
///
/// References are replaced by the schema they point at. A reference that
/// points back into one of its own ancestors (a recursive type) is left in
/// place; in that case the root `definitions`/`$defs` are attached to the
/// returned schema so the remaining `$ref`s still resolve when the schema is
/// compiled on its own.
///
/// # Errors
///
/// Returns [`SchemaError::UnresolvedRef`] for references that cannot be
/// resolved.
pub fn expand_schema_refs(root: &Value, schema: &Value) -> Result<Value, SchemaError> {
    let mut active = Vec::new();
    let mut kept_refs = false;
    let mut expanded = expand(root, schema, &mut active, &mut kept_refs)?;

    if kept_refs {
        if let (Value::Object(out), Some(root_obj)) = (&mut expanded, root.as_object()) {
            for key in ["definitions", "$defs"] {
                if let Some(defs) = root_obj.get(key) {
                    out.entry(key.to_string()).or_insert_with(|| defs.clone());
                }
            }
        }
    }
    Ok(expanded)
}

fn expand(
    root: &Value,
    value: &Value,
    active: &mut Vec<String>,
    kept_refs: &mut bool,
) -> Result<Value, SchemaError> {
    match value {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                if active.iter().any(|r| r == reference) {
                    *kept_refs = true;
                    return Ok(value.clone());
                }
                let target = resolve_schema_ref(root, reference)?;
                active.push(reference.to_string());
                let resolved = expand(root, target, active, kept_refs);
                active.pop();
                return resolved;
            }
            let mut out = Map::with_capacity(obj.len());
            for (k, v) in obj {
                out.insert(k.clone(), expand(root, v, active, kept_refs)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| expand(root, v, active, kept_refs))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}
