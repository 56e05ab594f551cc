//! Schema-derived sample values.
//!
//! Generated stub handlers return, and generated tests send, values built
//! from the resolved schema so they pass the schema's own validators.
//! `const`, `example`, `examples`, `default` and the first `enum` entry are
//! taken verbatim; otherwise objects get their `required` properties, arrays
//! get `minItems` copies of their item sample, and scalars get a placeholder
//! kept inside the declared bounds.

use serde_json::{Map, Value};

use super::naming::struct_type_name;

const MAX_DEPTH: usize = 8;

/// Build a sample instance of `schema`
///
/// Schemas that say nothing about their shape (including `$ref`s left in
/// place by recursive types) yield `null`.
pub fn sample_value(schema: &Value) -> Value {
    sample_at(schema, 0)
}

fn sample_at(schema: &Value, depth: usize) -> Value {
    let Value::Object(obj) = schema else {
        return Value::Null;
    };
    if let Some(v) = obj.get("const").or_else(|| obj.get("example")) {
        return v.clone();
    }
    if let Some(v) = first_of(obj.get("examples")) {
        return v.clone();
    }
    if let Some(v) = obj.get("default") {
        return v.clone();
    }
    if let Some(v) = first_of(obj.get("enum")) {
        return v.clone();
    }
    if depth >= MAX_DEPTH {
        return Value::Null;
    }
    if let Some(Value::Array(parts)) = obj.get("allOf") {
        if let [only] = parts.as_slice() {
            return sample_at(only, depth + 1);
        }
        let mut merged = Map::new();
        for part in parts {
            if let Value::Object(fields) = sample_at(part, depth + 1) {
                merged.extend(fields);
            }
        }
        return Value::Object(merged);
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(branch) = first_of(obj.get(key)) {
            return sample_at(branch, depth + 1);
        }
    }

    match schema_type(obj) {
        Some("object") => object_sample(obj, depth),
        Some("array") => array_sample(obj, depth),
        Some("integer") => Value::from(bounded(obj)),
        Some("number") => Value::from(bounded(obj) as f64),
        Some("boolean") => Value::Bool(true),
        Some("string") => Value::String(string_sample(obj)),
        Some(_) => Value::Null,
        None if obj.contains_key("properties") || obj.contains_key("required") => {
            object_sample(obj, depth)
        }
        None => Value::Null,
    }
}

fn first_of(value: Option<&Value>) -> Option<&Value> {
    value.and_then(Value::as_array).and_then(|list| list.first())
}

fn schema_type(obj: &Map<String, Value>) -> Option<&str> {
    match obj.get("type") {
        Some(Value::String(ty)) => Some(ty.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

fn object_sample(obj: &Map<String, Value>, depth: usize) -> Value {
    let properties = obj.get("properties").and_then(Value::as_object);
    let mut out = Map::new();
    for name in obj
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        let value = properties
            .and_then(|p| p.get(name))
            .map(|property| sample_at(property, depth + 1))
            .unwrap_or(Value::Null);
        out.insert(name.to_string(), value);
    }
    Value::Object(out)
}

fn array_sample(obj: &Map<String, Value>, depth: usize) -> Value {
    let count = obj.get("minItems").and_then(Value::as_u64).unwrap_or(0);
    if count == 0 {
        return Value::Array(Vec::new());
    }
    let item = obj
        .get("items")
        .map(|items| sample_at(items, depth + 1))
        .unwrap_or(Value::Null);
    Value::Array((0..count).map(|_| item.clone()).collect())
}

// 1, clamped into minimum/maximum (inclusive or exclusive)
fn bounded(obj: &Map<String, Value>) -> i64 {
    let bound = |key: &str| obj.get(key).and_then(Value::as_f64);
    let mut v: i64 = 1;
    if let Some(min) = bound("minimum") {
        v = v.max(min.ceil() as i64);
    }
    if let Some(min) = bound("exclusiveMinimum") {
        v = v.max(min.floor() as i64 + 1);
    }
    if let Some(max) = bound("maximum") {
        v = v.min(max.floor() as i64);
    }
    if let Some(max) = bound("exclusiveMaximum") {
        v = v.min(max.ceil() as i64 - 1);
    }
    v
}

fn string_sample(obj: &Map<String, Value>) -> String {
    let base = match obj.get("format").and_then(Value::as_str) {
        Some("date-time") => "2024-01-01T00:00:00Z",
        Some("date") => "2024-01-01",
        Some("time") => "00:00:00Z",
        Some("email") => "user@example.com",
        Some("uuid") => "00000000-0000-0000-0000-000000000000",
        Some("uri") | Some("url") => "https://example.com",
        Some("hostname") => "example.com",
        Some("ipv4") => "127.0.0.1",
        Some("ipv6") => "::1",
        _ => "example",
    };
    let mut s = base.to_string();
    let min = obj.get("minLength").and_then(Value::as_u64).unwrap_or(0) as usize;
    let len = s.chars().count();
    if len < min {
        s.push_str(&"x".repeat(min - len));
    }
    if let Some(max) = obj.get("maxLength").and_then(Value::as_u64) {
        s = s.chars().take(max as usize).collect();
    }
    s
}

/// Whether `value` is `null` or an empty object or array
pub fn is_empty_sample(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// The field-less struct stub that would lose data from `sample`, if any
///
/// Struct types are declared without fields in `types.rs`, so a sample that
/// carries object fields cannot survive a round trip through them.
pub fn lossy_struct(ty: &str, sample: &Value) -> Option<String> {
    fn has_fields(v: &Value) -> bool {
        match v {
            Value::Object(fields) => !fields.is_empty(),
            Value::Array(items) => items.iter().any(has_fields),
            _ => false,
        }
    }
    struct_type_name(ty).filter(|_| has_fields(sample))
}

/// Render `value` as a `serde_json::json!` expression
///
/// Strings are emitted as Rust literals, so any escape in the schema text
/// stays valid Rust.
pub fn json_literal(value: &Value) -> String {
    format!("serde_json::json!({})", json_tokens(value))
}

fn json_tokens(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(json_tokens).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(fields) => {
            let inner: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{k:?}: {}", json_tokens(v)))
                .collect();
            format!("{{ {} }}", inner.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_properties_are_filled() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "minimum": 10 },
                "name": { "type": "string" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "note": { "type": "string" }
            },
            "required": ["id", "name", "tags"]
        });
        assert_eq!(
            sample_value(&schema),
            json!({ "id": 10, "name": "example", "tags": [] })
        );
    }

    #[test]
    fn test_declared_values_win() {
        assert_eq!(sample_value(&json!({ "type": "string", "enum": ["red", "blue"] })), json!("red"));
        assert_eq!(sample_value(&json!({ "type": "integer", "example": 7 })), json!(7));
        assert_eq!(sample_value(&json!({ "examples": [false] })), json!(false));
        assert_eq!(sample_value(&json!({ "const": "v1", "type": "string" })), json!("v1"));
    }

    #[test]
    fn test_scalar_bounds_and_formats() {
        assert_eq!(sample_value(&json!({ "type": "integer", "exclusiveMaximum": 0 })), json!(-1));
        assert_eq!(sample_value(&json!({ "type": "string", "minLength": 9 })), json!("examplexx"));
        assert_eq!(sample_value(&json!({ "type": "string", "maxLength": 3 })), json!("exa"));
        assert_eq!(
            sample_value(&json!({ "type": "string", "format": "email" })),
            json!("user@example.com")
        );
        assert_eq!(sample_value(&json!({ "type": ["null", "boolean"] })), json!(true));
        assert_eq!(sample_value(&json!({})), Value::Null);
    }

    #[test]
    fn test_samples_pass_their_schema() {
        let schema = json!({
            "type": "object",
            "properties": {
                "when": { "type": "string", "format": "date-time" },
                "items": {
                    "type": "array",
                    "minItems": 2,
                    "items": { "type": "object", "properties": { "n": { "type": "number" } }, "required": ["n"] }
                },
                "kind": { "oneOf": [{ "type": "integer", "maximum": 0 }, { "type": "string" }] }
            },
            "required": ["when", "items", "kind"]
        });
        let sample = sample_value(&schema);
        let validator = jsonschema::validator_for(&schema).unwrap();
        assert!(validator.is_valid(&sample), "{sample}");
    }

    #[test]
    fn test_lossy_struct() {
        assert_eq!(lossy_struct("Item", &json!({ "id": 1 })), Some("Item".to_string()));
        assert_eq!(lossy_struct("Vec<Item>", &json!([{ "id": 1 }])), Some("Item".to_string()));
        assert_eq!(lossy_struct("Item", &json!({})), None);
        assert_eq!(lossy_struct("serde_json::Value", &json!({ "id": 1 })), None);
    }

    #[test]
    fn test_json_literal_uses_rust_escapes() {
        let value = json!({ "a\u{1}": ["x\"y", 1, null, { "b": true }] });
        assert_eq!(
            json_literal(&value),
            r#"serde_json::json!({ "a\u{1}": ["x\"y", 1, null, { "b": true }] })"#
        );
    }
}
