use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::resolve::expand_schema_refs;
use crate::error::SchemaError;

/// Request encoding used when a link declares no `encType`
pub const DEFAULT_ENC_TYPE: &str = "application/json";

/// Form encoding that switches request binding to query-style decoding
pub const FORM_ENC_TYPE: &str = "application/x-www-form-urlencoded";

/// Multipart encoding used for file uploads
pub const MULTIPART_ENC_TYPE: &str = "multipart/form-data";

/// One schema-described hyperlink
///
/// Unknown keys are captured in `extras` and decoded into typed
/// [`crate::parser::LinkExtensions`] at parse time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Link {
    /// Link title, the source of the derived method name
    #[serde(default)]
    pub title: Option<String>,
    /// HTTP method; `GET` when absent
    #[serde(default)]
    pub method: Option<String>,
    /// URL path of the endpoint
    #[serde(default)]
    pub href: String,
    /// Request encoding (`application/json` when absent)
    #[serde(default, rename = "encType")]
    pub enc_type: Option<String>,
    /// Request payload schema
    #[serde(default)]
    pub schema: Option<Value>,
    /// Response payload schema
    #[serde(default, rename = "targetSchema")]
    pub target_schema: Option<Value>,
    /// Vendor extension keys and anything else the model does not name
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl Link {
    /// Upper-cased HTTP method, defaulting to `GET`
    pub fn verb(&self) -> String {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    /// Request encoding, defaulting to [`DEFAULT_ENC_TYPE`]
    pub fn encoding(&self) -> &str {
        self.enc_type
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENC_TYPE)
    }
}

/// A parsed hyper-schema document
///
/// Keeps the raw root value around so that `$ref`s inside link schemas can
/// be resolved against it.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperSchema {
    /// The complete document
    pub root: Value,
    /// Document title, if any
    pub title: Option<String>,
    /// All links, root links first, then links nested in definitions
    pub links: Vec<Link>,
}

impl HyperSchema {
    /// Build a document from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an object or a `links` entry
    /// cannot be decoded as a [`Link`].
    pub fn from_value(root: Value) -> anyhow::Result<Self> {
        let obj = root
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("hyper-schema root must be a JSON object"))?;

        let mut links = Vec::new();
        if let Some(list) = obj.get("links") {
            links.extend(decode_links(list, "links")?);
        }
        if let Some(Value::Object(defs)) = obj.get("definitions") {
            let mut names: Vec<&String> = defs.keys().collect();
            names.sort();
            for name in names {
                if let Some(list) = defs.get(name).and_then(|d| d.get("links")) {
                    links.extend(decode_links(list, &format!("definitions/{name}/links"))?);
                }
            }
        }

        let title = obj.get("title").and_then(Value::as_str).map(str::to_string);
        Ok(HyperSchema { root, title, links })
    }

    /// Look up a document-level extension key
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Resolve every `$ref` inside `schema` against this document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedRef`] for references that do not point
    /// into the document.
    pub fn resolve(&self, schema: &Value) -> Result<Value, SchemaError> {
        expand_schema_refs(&self.root, schema)
    }

    /// Package-name slug derived from the document title
    ///
    /// Lower-cases the title and replaces every non alphanumeric character
    /// with `_`. Falls back to `app` when nothing usable is left.
    pub fn slug(&self) -> String {
        let slug = self
            .title
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
            .trim_matches('_')
            .to_string();
        if slug.is_empty() || slug.starts_with(|c: char| c.is_ascii_digit()) {
            "app".to_string()
        } else {
            slug
        }
    }
}

fn decode_links(list: &Value, location: &str) -> anyhow::Result<Vec<Link>> {
    let items = list
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("'{location}' must be an array of links"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<Link>(item.clone())
                .map_err(|e| anyhow::anyhow!("invalid link at {location}[{i}]: {e}"))
        })
        .collect()
}
