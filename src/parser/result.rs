use http::Method;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::generator::naming::{struct_type_name, to_snake_case};
use crate::schema::{FORM_ENC_TYPE, MULTIPART_ENC_TYPE};
use crate::validator::ValidatorHandle;

/// Everything the renderers need to know about one link
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    /// Derived method name, e.g. `GetItem`
    pub name: String,
    /// Link title as written in the schema
    pub title: String,
    /// HTTP method
    pub verb: Method,
    /// Normalised URL path, always starting with `/`
    pub path: String,
    /// Request encoding
    pub enc_type: String,
    /// Resolved request schema
    pub request_schema: Option<Value>,
    /// Resolved response schema
    pub response_schema: Option<Value>,
    /// Multipart file-upload field names
    pub files: Vec<String>,
}

impl MethodSpec {
    /// Whether the request payload is rebuilt from query/form parameters
    pub fn is_query_bound(&self) -> bool {
        self.verb == Method::GET || self.enc_type == FORM_ENC_TYPE
    }

    /// Whether the request is sent as `multipart/form-data`
    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty() || self.enc_type == MULTIPART_ENC_TYPE
    }

    /// snake_case form of the method name
    pub fn snake_name(&self) -> String {
        to_snake_case(&self.name)
    }

    /// Name of the generated route handler (`http_get_item`)
    pub fn route_handler(&self) -> String {
        format!("http_{}", self.snake_name())
    }

    /// Name of the user stub handler (`do_get_item`)
    pub fn stub_handler(&self) -> String {
        format!("do_{}", self.snake_name())
    }
}

/// Intermediate model built by [`crate::parser::parse`]
///
/// Built once per run and only read afterwards. Every map is keyed by the
/// derived method name except `path_to_methods`, and all of them are ordered
/// so rendering is deterministic.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Package-name slug of the document title
    pub slug: String,
    /// Derived method names, sorted ascending
    pub method_names: Vec<String>,
    /// Per-method link detail
    pub methods: BTreeMap<String, MethodSpec>,
    /// URL path to the method that serves it
    pub path_to_methods: BTreeMap<String, String>,
    /// Request payload type per method (only methods with a request schema)
    pub request_payload_type: BTreeMap<String, String>,
    /// Response payload type per method (only methods with a target schema)
    pub response_payload_type: BTreeMap<String, String>,
    /// Request validators per method
    pub request_validators: BTreeMap<String, Box<dyn ValidatorHandle>>,
    /// Response validators per method
    pub response_validators: BTreeMap<String, Box<dyn ValidatorHandle>>,
    /// Middleware chain per method; the first wraps the handler directly
    pub method_wrappers: BTreeMap<String, Vec<String>>,
    /// Middleware applied to every route, outside the per-method chain
    pub middlewares: Vec<String>,
    /// Allowed CORS origin per method
    pub request_cors: BTreeMap<String, String>,
    /// Payload mutators per method, in application order
    pub request_mutators: BTreeMap<String, Vec<String>>,
    /// Extra `use` trees for the server file per method
    pub method_imports: BTreeMap<String, Vec<String>>,
}

impl ParseResult {
    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    /// Methods in `method_names` order
    pub fn iter_methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.method_names.iter().filter_map(|n| self.methods.get(n))
    }

    /// Routed methods in path order
    pub fn routes(&self) -> impl Iterator<Item = (&str, &MethodSpec)> {
        self.path_to_methods
            .iter()
            .filter_map(|(path, name)| self.methods.get(name).map(|m| (path.as_str(), m)))
    }

    /// Distinct payload types that look like structs, sorted
    pub fn struct_types(&self) -> BTreeSet<String> {
        self.request_payload_type
            .values()
            .chain(self.response_payload_type.values())
            .filter_map(|ty| struct_type_name(ty))
            .collect()
    }

    /// All validators, request validators first, each group in method order
    pub fn validators(&self) -> Vec<&dyn ValidatorHandle> {
        self.request_validators
            .values()
            .chain(self.response_validators.values())
            .map(|v| v.as_ref())
            .collect()
    }

    /// Drop every trace of `name`, used when a later link reuses the name
    pub(crate) fn remove_method(&mut self, name: &str) {
        self.methods.remove(name);
        self.path_to_methods.retain(|_, m| m != name);
        self.request_payload_type.remove(name);
        self.response_payload_type.remove(name);
        self.request_validators.remove(name);
        self.response_validators.remove(name);
        self.method_wrappers.remove(name);
        self.request_cors.remove(name);
        self.request_mutators.remove(name);
        self.method_imports.remove(name);
    }
}
