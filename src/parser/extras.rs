use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::generator::naming::{is_rust_path, is_rust_type, is_use_tree};

/// Vendor extension keys understood by the parser
pub mod ext {
    /// Payload type override on a request/target schema
    pub const TYPE_KEY: &str = "rusttype";
    /// Middleware chain on a link, applied in order around the handler
    pub const WRAPPER_KEY: &str = "wrapper";
    /// Allowed CORS origin on a link
    pub const CORS_KEY: &str = "cors";
    /// Payload mutators on a link
    pub const MUTATORS_KEY: &str = "mutators";
    /// Extra `use` paths for the server file on a link
    pub const IMPORTS_KEY: &str = "imports";
    /// Multipart file-upload field names on a link
    pub const FILES_KEY: &str = "files";
    /// Global middleware list on the document root
    pub const MIDDLEWARES_KEY: &str = "middlewares";
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// Typed view of a link's vendor extensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkExtensions {
    /// Middleware identifiers; the first wraps the handler directly
    pub wrapper: Vec<String>,
    /// Allowed CORS origin
    pub cors: Option<String>,
    /// Payload mutator identifiers, applied in order
    pub mutators: Vec<String>,
    /// `use` trees added to the server file
    pub imports: Vec<String>,
    /// Multipart file-upload field names
    pub files: Vec<String>,
}

impl LinkExtensions {
    /// Decode the extension keys of one link.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ExtraShape`] when a key holds something other
    /// than the accepted shape, and [`SchemaError::InvalidIdentifier`] when an
    /// identifier cannot be emitted as Rust.
    pub fn decode(method: &str, extras: &BTreeMap<String, Value>) -> Result<Self, SchemaError> {
        let wrapper = rust_paths(method, ext::WRAPPER_KEY, extras.get(ext::WRAPPER_KEY))?;
        let mutators = rust_paths(method, ext::MUTATORS_KEY, extras.get(ext::MUTATORS_KEY))?;

        let imports = string_or_list(method, ext::IMPORTS_KEY, extras.get(ext::IMPORTS_KEY))?;
        if let Some(bad) = imports.iter().find(|i| !is_use_tree(i)) {
            return Err(invalid(method, ext::IMPORTS_KEY, bad));
        }

        let files = string_or_list(method, ext::FILES_KEY, extras.get(ext::FILES_KEY))?;
        if let Some(bad) = files.iter().find(|f| f.trim().is_empty()) {
            return Err(invalid(method, ext::FILES_KEY, bad));
        }

        let cors = match extras.get(ext::CORS_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(origin)) => Some(origin.clone()),
            Some(_) => {
                return Err(SchemaError::ExtraShape {
                    method: method.to_string(),
                    key: ext::CORS_KEY.to_string(),
                    expected: "a string",
                })
            }
        };

        Ok(LinkExtensions {
            wrapper,
            cors,
            mutators,
            imports,
            files,
        })
    }
}

/// Decode a value that may be a single string or a list of strings.
///
/// Absent and `null` values decode to an empty list.
///
/// # Errors
///
/// Returns [`SchemaError::ExtraShape`] for any other shape.
pub fn string_or_list(method: &str, key: &str, value: Option<&Value>) -> Result<Vec<String>, SchemaError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => match serde_json::from_value::<StringOrList>(v.clone()) {
            Ok(StringOrList::One(s)) => Ok(vec![s]),
            Ok(StringOrList::Many(list)) => Ok(list),
            Err(_) => Err(SchemaError::ExtraShape {
                method: method.to_string(),
                key: key.to_string(),
                expected: "a string or an array of strings",
            }),
        },
    }
}

/// Decode a string-or-list of Rust paths (middleware, mutators).
///
/// # Errors
///
/// Returns a shape error, or [`SchemaError::InvalidIdentifier`] for values
/// that are not Rust paths.
pub fn rust_paths(method: &str, key: &str, value: Option<&Value>) -> Result<Vec<String>, SchemaError> {
    let list = string_or_list(method, key, value)?;
    if let Some(bad) = list.iter().find(|p| !is_rust_path(p)) {
        return Err(invalid(method, key, bad));
    }
    Ok(list)
}

/// Read the explicit payload type of a schema, if it carries one.
///
/// # Errors
///
/// Returns a shape error when the key is not a string and
/// [`SchemaError::InvalidIdentifier`] when it cannot stand in type position.
pub fn explicit_type(method: &str, schema: &Value) -> Result<Option<String>, SchemaError> {
    match schema.get(ext::TYPE_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(ty)) if is_rust_type(ty) => Ok(Some(ty.trim().to_string())),
        Some(Value::String(ty)) => Err(invalid(method, ext::TYPE_KEY, ty)),
        Some(_) => Err(SchemaError::ExtraShape {
            method: method.to_string(),
            key: ext::TYPE_KEY.to_string(),
            expected: "a string",
        }),
    }
}

fn invalid(method: &str, key: &str, value: &str) -> SchemaError {
    SchemaError::InvalidIdentifier {
        method: method.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}
