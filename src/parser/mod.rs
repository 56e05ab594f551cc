//! # Parser Module
//!
//! Walks the links of a [`HyperSchema`] once and builds the [`ParseResult`]
//! every renderer reads from.
//!
//! ## Per-link rules
//!
//! - The method name comes from the title (`"get item"` → `GetItem`); a link
//!   without a usable title fails the whole parse.
//! - The path must not be a URI template. A `{` anywhere in it is an error.
//! - Request and target schemas are resolved against the document, compiled
//!   by the [`ValidatorBuilder`] and given a payload type: an explicit
//!   `rusttype` wins, otherwise query-bound requests (GET or form encoded)
//!   get a map type and everything else `serde_json::Value`.
//! - Vendor extras are decoded into [`LinkExtensions`].
//!
//! ## Conflicts
//!
//! A later link with the same derived name replaces the earlier one. A later
//! link with the same path takes the route; the earlier method keeps its
//! handler but is no longer routed. Both cases log a warning.
//!
//! Distinct names that share a snake_case form (`ListItems`, `List_items`)
//! are rejected, as is an identifier used both as a middleware and as a
//! mutator.
//!
//! No partial result is ever returned: the first error aborts the parse.

mod extras;
mod result;

pub use extras::*;
pub use result::*;

use anyhow::Context;
use http::Method;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::generator::naming::{
    method_name, request_validator_name, response_validator_name, to_snake_case, ANY_TYPE,
    MAP_TYPE,
};
use crate::schema::{HyperSchema, Link};
use crate::validator::ValidatorBuilder;

const STANDARD_METHODS: &[Method] = &[
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

/// Parse a hyper-schema document into a [`ParseResult`].
///
/// # Errors
///
/// Returns a [`SchemaError`] (wrapped in `anyhow`) for schema problems and
/// the builder's error when a validator cannot be compiled.
pub fn parse(doc: &HyperSchema, builder: &dyn ValidatorBuilder) -> anyhow::Result<ParseResult> {
    let mut result = ParseResult {
        slug: doc.slug(),
        middlewares: rust_paths(
            "<root>",
            ext::MIDDLEWARES_KEY,
            doc.extension(ext::MIDDLEWARES_KEY),
        )?,
        ..ParseResult::default()
    };

    for (index, link) in doc.links.iter().enumerate() {
        parse_link(doc, builder, &mut result, index, link)?;
    }

    result.method_names = result.methods.keys().cloned().collect();
    result.method_names.sort();
    check_identifiers(&result)?;
    check_hooks(&result)?;
    debug!(
        methods = result.method_names.len(),
        routes = result.path_to_methods.len(),
        "parsed hyper-schema"
    );
    Ok(result)
}

fn parse_link(
    doc: &HyperSchema,
    builder: &dyn ValidatorBuilder,
    result: &mut ParseResult,
    index: usize,
    link: &Link,
) -> anyhow::Result<()> {
    let title = link.title.as_deref().unwrap_or_default().trim();
    let name = method_name(title);
    if name.is_empty() {
        return Err(SchemaError::MissingTitle { index }.into());
    }

    let verb_text = link.verb();
    let verb = STANDARD_METHODS
        .iter()
        .find(|m| m.as_str() == verb_text)
        .cloned()
        .ok_or_else(|| SchemaError::InvalidMethod {
            method: name.clone(),
            verb: verb_text.clone(),
        })?;

    if link.href.contains('{') {
        return Err(SchemaError::UriTemplatePath {
            method: name,
            path: link.href.clone(),
        }
        .into());
    }
    let path = normalize_path(&link.href);
    let extensions = LinkExtensions::decode(&name, &link.extras)?;

    let mut method_spec = MethodSpec {
        name: name.clone(),
        title: title.to_string(),
        verb,
        path: path.clone(),
        enc_type: link.encoding().to_string(),
        request_schema: None,
        response_schema: None,
        files: extensions.files.clone(),
    };

    let request = match &link.schema {
        Some(raw) => {
            let resolved = doc.resolve(raw)?;
            let ty = match explicit_type(&name, raw)? {
                Some(ty) => ty,
                None => match explicit_type(&name, &resolved)? {
                    Some(ty) => ty,
                    None if method_spec.is_query_bound() => MAP_TYPE.to_string(),
                    None => ANY_TYPE.to_string(),
                },
            };
            let vname = request_validator_name(&name);
            let handle = builder
                .build(&vname, &resolved, &doc.root)
                .with_context(|| format!("Failed to build request validator for {name}"))?;
            method_spec.request_schema = Some(resolved);
            Some((ty, handle))
        }
        None => None,
    };

    let response = match &link.target_schema {
        Some(raw) => {
            let resolved = doc.resolve(raw)?;
            let ty = match explicit_type(&name, raw)? {
                Some(ty) => Some(ty),
                None => explicit_type(&name, &resolved)?,
            }
            .unwrap_or_else(|| ANY_TYPE.to_string());
            let vname = response_validator_name(&name);
            let handle = builder
                .build(&vname, &resolved, &doc.root)
                .with_context(|| format!("Failed to build response validator for {name}"))?;
            method_spec.response_schema = Some(resolved);
            Some((ty, handle))
        }
        None => None,
    };

    if result.methods.contains_key(&name) {
        warn!(method = %name, index, "duplicate method name, later link replaces the earlier one");
        result.remove_method(&name);
    }
    if let Some(previous) = result.path_to_methods.get(&path) {
        warn!(
            path = %path,
            previous = %previous,
            method = %name,
            "duplicate path, last link wins the route"
        );
    }

    debug!(method = %name, verb = %method_spec.verb, path = %path, "parsed link");

    if let Some((ty, handle)) = request {
        result.request_payload_type.insert(name.clone(), ty);
        result.request_validators.insert(name.clone(), handle);
    }
    if let Some((ty, handle)) = response {
        result.response_payload_type.insert(name.clone(), ty);
        result.response_validators.insert(name.clone(), handle);
    }
    if !extensions.wrapper.is_empty() {
        result.method_wrappers.insert(name.clone(), extensions.wrapper);
    }
    if let Some(origin) = extensions.cors {
        result.request_cors.insert(name.clone(), origin);
    }
    if !extensions.mutators.is_empty() {
        result.request_mutators.insert(name.clone(), extensions.mutators);
    }
    if !extensions.imports.is_empty() {
        result.method_imports.insert(name.clone(), extensions.imports);
    }
    result.path_to_methods.insert(path, name.clone());
    result.methods.insert(name, method_spec);
    Ok(())
}

// Every generated fn and static is named from the snake_case method name
fn check_identifiers(result: &ParseResult) -> Result<(), SchemaError> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for name in &result.method_names {
        if let Some(other) = seen.insert(to_snake_case(name), name) {
            return Err(SchemaError::NameCollision {
                method: name.clone(),
                other: other.to_string(),
            });
        }
    }
    Ok(())
}

// Middlewares take a handler and mutators take `&mut Value`; one fn cannot be both
fn check_hooks(result: &ParseResult) -> Result<(), SchemaError> {
    let wrappers: BTreeSet<&String> = result
        .middlewares
        .iter()
        .chain(result.method_wrappers.values().flatten())
        .collect();
    for (method, mutators) in &result.request_mutators {
        if let Some(name) = mutators.iter().find(|m| wrappers.contains(m)) {
            return Err(SchemaError::HookConflict {
                method: method.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn normalize_path(href: &str) -> String {
    let trimmed = href.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
