use std::fmt;

/// Schema error
///
/// Returned by the parser and the renderers when the hyper-schema describes
/// something the generator cannot turn into code. Every variant carries
/// enough context (link index, method name, key) to find the offending
/// fragment in the schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A link has no title, so no identifier can be derived for it
    MissingTitle {
        /// Position of the link in the collected link list
        index: usize,
    },
    /// The link path is a URI template (contains `{`)
    UriTemplatePath {
        /// Derived method name
        method: String,
        /// The offending path
        path: String,
    },
    /// A query-bound property declares more than one JSON type
    MultiTypedProperty {
        /// Derived method name
        method: String,
        /// Property name inside the request schema
        property: String,
    },
    /// A vendor extension key holds a value of the wrong shape
    ExtraShape {
        /// Derived method name, or `<root>` for document-level keys
        method: String,
        /// Extension key
        key: String,
        /// Human readable description of the accepted shape
        expected: &'static str,
    },
    /// A vendor extension value is not a valid Rust identifier or path
    InvalidIdentifier {
        /// Derived method name, or `<root>` for document-level keys
        method: String,
        /// Extension key
        key: String,
        /// The rejected value
        value: String,
    },
    /// A `$ref` could not be resolved against the root document
    UnresolvedRef {
        /// The reference as written in the schema
        reference: String,
    },
    /// The link method is not a valid HTTP method token
    InvalidMethod {
        /// Derived method name
        method: String,
        /// The rejected verb
        verb: String,
    },
    /// Two distinct method names produce the same Rust identifiers
    NameCollision {
        /// The later method name in sort order
        method: String,
        /// The method it collides with
        other: String,
    },
    /// An identifier is used both as a middleware and as a mutator
    HookConflict {
        /// Method declaring the mutator
        method: String,
        /// The shared identifier
        name: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingTitle { index } => {
                write!(
                    f,
                    "schema error: link #{index} has no title. \
                    A title is required to derive the method name."
                )
            }
            SchemaError::UriTemplatePath { method, path } => {
                write!(
                    f,
                    "schema error: {method}: path '{path}' is a URI template. \
                    Templated paths are not supported."
                )
            }
            SchemaError::MultiTypedProperty { method, property } => {
                write!(
                    f,
                    "schema error: {method}: property '{property}' declares multiple types. \
                    Query-bound properties must have a single type."
                )
            }
            SchemaError::ExtraShape {
                method,
                key,
                expected,
            } => {
                write!(
                    f,
                    "schema error: {method}: extension '{key}' must be {expected}"
                )
            }
            SchemaError::InvalidIdentifier { method, key, value } => {
                write!(
                    f,
                    "schema error: {method}: extension '{key}' value '{value}' is not a valid Rust path"
                )
            }
            SchemaError::UnresolvedRef { reference } => {
                write!(f, "schema error: cannot resolve reference '{reference}'")
            }
            SchemaError::InvalidMethod { method, verb } => {
                write!(f, "schema error: {method}: '{verb}' is not a valid HTTP method")
            }
            SchemaError::NameCollision { method, other } => {
                write!(
                    f,
                    "schema error: {method} and {other} map to the same Rust identifiers. \
                    Rename one of the link titles."
                )
            }
            SchemaError::HookConflict { method, name } => {
                write!(
                    f,
                    "schema error: {method}: '{name}' is used as both a middleware and a mutator"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}
