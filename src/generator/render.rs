//! View-model builders and the per-artifact render entry point.
//!
//! Every builder reads the [`ParseResult`] through a shared [`RenderContext`]
//! and returns plain data; the askama templates in `templates/` turn that
//! data into text. Keeping the two apart lets tests assert on the route table
//! or the client methods without matching generated source line by line.

use askama::Template;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::artifact::{ArtifactKind, ModuleNames};
use super::naming::{
    is_rust_path, render_imports, request_validator_name, response_validator_name,
    sanitize_field_name, string_literal, ANY_TYPE, MAP_TYPE,
};
use super::sample::{is_empty_sample, json_literal, lossy_struct, sample_value};
use super::templates::{
    CargoTomlTemplate, ClientMethod, ClientTemplate, FileField, HandlerStub, HandlersTemplate,
    LibTemplate, MainTemplate, QueryField, RouteRegistration, ServerRoute, ServerTemplate,
    TestCase, TestsTemplate, TypesTemplate, ValidatorsTemplate,
};
use crate::error::SchemaError;
use crate::parser::{MethodSpec, ParseResult};
use crate::validator::{validator_static_ident, ValidatorBuilder};

/// Everything a renderer may read
pub struct RenderContext<'a> {
    /// The parsed schema
    pub result: &'a ParseResult,
    /// Builder that emits the validator registration code
    pub builder: &'a dyn ValidatorBuilder,
    /// Package name written to the manifest
    pub package_name: String,
    /// Module naming of the generated crate
    pub names: ModuleNames,
    /// Artifact kinds rendered in this run
    pub kinds: BTreeSet<ArtifactKind>,
    /// JSON body limit of the generated server
    pub max_body_bytes: usize,
    /// Extra `use` trees per artifact kind
    pub imports: BTreeMap<ArtifactKind, Vec<String>>,
    /// Document title
    pub title: String,
}

impl RenderContext<'_> {
    fn imports_for(&self, kind: ArtifactKind) -> BTreeSet<String> {
        self.imports
            .get(&kind)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn request_type(&self, method: &str) -> Option<&str> {
        self.result.request_payload_type.get(method).map(String::as_str)
    }

    fn response_type(&self, method: &str) -> Option<&str> {
        self.result.response_payload_type.get(method).map(String::as_str)
    }
}

/// Render one artifact to text.
///
/// # Errors
///
/// Returns schema errors raised while building the view model and template
/// or validator-builder failures.
pub fn render_artifact(kind: ArtifactKind, ctx: &RenderContext<'_>) -> anyhow::Result<String> {
    let text = match kind {
        ArtifactKind::Lib => LibTemplate {
            title: ctx.title.lines().next().unwrap_or_default().to_string(),
            modules: lib_modules(ctx),
            imports: render_imports(&ctx.imports_for(kind)),
        }
        .render()?,
        ArtifactKind::Server => {
            let mut imports = ctx.imports_for(kind);
            imports.extend(ctx.result.method_imports.values().flatten().cloned());
            ServerTemplate {
                imports: render_imports(&imports),
                validator_module: ctx.names.validators.clone(),
                max_body_bytes: ctx.max_body_bytes,
                routes: server_routes(ctx)?,
                registrations: route_registrations(ctx.result),
            }
            .render()?
        }
        ArtifactKind::Client => ClientTemplate {
            imports: render_imports(&ctx.imports_for(kind)),
            methods: client_methods(ctx),
        }
        .render()?,
        ArtifactKind::Handlers => {
            let (middlewares, mutators) = hook_stubs(ctx.result);
            HandlersTemplate {
                imports: render_imports(&ctx.imports_for(kind)),
                stubs: handler_stubs(ctx),
                middlewares,
                mutators,
            }
            .render()?
        }
        ArtifactKind::Types => TypesTemplate {
            imports: render_imports(&ctx.imports_for(kind)),
            types: ctx.result.struct_types().into_iter().collect(),
        }
        .render()?,
        ArtifactKind::Validators => render_validators(ctx)?,
        ArtifactKind::Main => MainTemplate {
            crate_ident: ctx.names.crate_ident.clone(),
            addr_env: format!("{}_ADDR", ctx.names.crate_ident.to_ascii_uppercase()),
            imports: render_imports(&ctx.imports_for(kind)),
        }
        .render()?,
        ArtifactKind::Manifest => CargoTomlTemplate {
            package_name: ctx.package_name.clone(),
            server: ctx.kinds.contains(&ArtifactKind::Server),
            client: ctx.kinds.contains(&ArtifactKind::Client),
            validators: ctx.kinds.contains(&ArtifactKind::Validators),
        }
        .render()?,
        ArtifactKind::Tests => TestsTemplate {
            crate_ident: ctx.names.crate_ident.clone(),
            client_module: ctx.names.client.clone(),
            validator_module: ctx.names.validators.clone(),
            has_uploads: ctx.result.iter_methods().any(|m| !m.files.is_empty()),
            imports: render_imports(&ctx.imports_for(kind)),
            cases: test_cases(ctx),
        }
        .render()?,
    };
    Ok(text)
}

/// Modules declared in `lib.rs`, sorted
pub fn lib_modules(ctx: &RenderContext<'_>) -> Vec<String> {
    let modules: BTreeSet<String> = ctx
        .kinds
        .iter()
        .filter_map(|k| k.module_name(&ctx.names))
        .collect();
    modules.into_iter().collect()
}

/// Property bindings for a query-bound request schema.
///
/// # Errors
///
/// Returns [`SchemaError::MultiTypedProperty`] when a property (or the items
/// of an array property) declares more than one type.
pub fn query_fields(method: &str, schema: &Value) -> Result<Vec<QueryField>, SchemaError> {
    let Some(Value::Object(properties)) = schema.get("properties") else {
        return Ok(Vec::new());
    };
    let mut fields = Vec::with_capacity(properties.len());
    for (name, property) in properties {
        let kind = single_type(method, name, property)?.unwrap_or_else(|| "string".to_string());
        let items_literal = if kind == "array" {
            let item_kind = match property.get("items") {
                Some(items) => single_type(method, name, items)?,
                None => None,
            };
            format!("Some({})", string_literal(item_kind.as_deref().unwrap_or("string")))
        } else {
            "None".to_string()
        };
        fields.push(QueryField {
            name_literal: string_literal(name),
            kind_literal: string_literal(&kind),
            items_literal,
        });
    }
    Ok(fields)
}

fn single_type(method: &str, property: &str, schema: &Value) -> Result<Option<String>, SchemaError> {
    let multi = || SchemaError::MultiTypedProperty {
        method: method.to_string(),
        property: property.to_string(),
    };
    match schema.get("type") {
        Some(Value::String(ty)) => Ok(Some(ty.clone())),
        Some(Value::Array(types)) if types.len() > 1 => Err(multi()),
        Some(Value::Array(types)) => Ok(types.first().and_then(Value::as_str).map(str::to_string)),
        _ => Ok(None),
    }
}

fn summary(m: &MethodSpec) -> String {
    format!("{} {}", m.verb, m.path)
}

fn decodes_payload(ctx: &RenderContext<'_>, m: &MethodSpec) -> bool {
    !m.is_multipart() && ctx.request_type(&m.name).is_some()
}

/// Route handler view models in method-name order.
///
/// # Errors
///
/// Fails on multi-typed properties in query-bound request schemas.
pub fn server_routes(ctx: &RenderContext<'_>) -> Result<Vec<ServerRoute>, SchemaError> {
    let result = ctx.result;
    let mut routes = Vec::with_capacity(result.method_names.len());
    for m in result.iter_methods() {
        let has_payload = decodes_payload(ctx, m);
        let query_bound = has_payload && m.is_query_bound();
        let fields = match (&m.request_schema, query_bound) {
            (Some(schema), true) => query_fields(&m.name, schema)?,
            _ => Vec::new(),
        };
        let request_validator = if has_payload && result.request_validators.contains_key(&m.name) {
            validator_static_ident(&request_validator_name(&m.name))
        } else {
            String::new()
        };
        routes.push(ServerRoute {
            method: m.name.clone(),
            summary: summary(m),
            handler: m.route_handler(),
            stub: m.stub_handler(),
            verb: m.verb.as_str().to_string(),
            has_payload,
            query_bound,
            query_from_body: query_bound && m.verb != http::Method::GET,
            fields,
            mutators: if has_payload {
                result.request_mutators.get(&m.name).cloned().unwrap_or_default()
            } else {
                Vec::new()
            },
            request_validator,
            payload_type: ctx.request_type(&m.name).unwrap_or_default().to_string(),
            has_response: ctx.response_type(&m.name).is_some(),
            cors_literal: result
                .request_cors
                .get(&m.name)
                .map(|origin| string_literal(origin))
                .unwrap_or_default(),
            stub_args: if has_payload { "req, payload" } else { "req" }.to_string(),
        });
    }
    Ok(routes)
}

/// Apply `chain` to `handler` in declaration order
///
/// Each middleware wraps everything before it: `["auth", "log"]` gives
/// `log(auth(handler))`.
pub fn wrap_handler(handler: &str, chain: &[String]) -> String {
    chain
        .iter()
        .fold(handler.to_string(), |inner, mw| format!("{mw}({inner})"))
}

/// Route registrations in path order
///
/// Global middlewares are applied after the per-method chain, so they end
/// up outermost.
pub fn route_registrations(result: &ParseResult) -> Vec<RouteRegistration> {
    result
        .routes()
        .map(|(path, m)| {
            let mut chain = result.method_wrappers.get(&m.name).cloned().unwrap_or_default();
            chain.extend(result.middlewares.iter().cloned());
            RouteRegistration {
                path_literal: string_literal(path),
                expr: wrap_handler(&m.route_handler(), &chain),
            }
        })
        .collect()
}

/// Client method view models in method-name order
pub fn client_methods(ctx: &RenderContext<'_>) -> Vec<ClientMethod> {
    ctx.result
        .iter_methods()
        .map(|m| {
            let payload_type = ctx.request_type(&m.name);
            let multipart = m.is_multipart();
            let files = file_fields(m);
            let mut params = String::new();
            if let Some(ty) = payload_type {
                params.push_str(&format!(", payload: &{ty}"));
            }
            for f in &files {
                params.push_str(&format!(", {}: &std::path::Path", f.ident));
            }
            let has_payload = payload_type.is_some();
            ClientMethod {
                summary: summary(m),
                name: sanitize_field_name(&m.snake_name()),
                verb: m.verb.as_str().to_string(),
                path_literal: string_literal(&m.path),
                params,
                query: has_payload && !multipart && m.verb == http::Method::GET,
                form: has_payload && !multipart && m.verb != http::Method::GET && m.is_query_bound(),
                json: has_payload && !multipart && !m.is_query_bound(),
                multipart,
                has_payload,
                files,
                return_type: ctx.response_type(&m.name).unwrap_or("()").to_string(),
                has_response: ctx.response_type(&m.name).is_some(),
            }
        })
        .collect()
}

fn file_fields(m: &MethodSpec) -> Vec<FileField> {
    m.files
        .iter()
        .map(|f| FileField {
            name_literal: string_literal(f),
            ident: sanitize_field_name(f),
        })
        .collect()
}

fn request_sample(m: &MethodSpec, payload_type: &str) -> Value {
    let sample = m.request_schema.as_ref().map(sample_value).unwrap_or(Value::Null);
    if payload_type == MAP_TYPE && !sample.is_object() {
        Value::Object(serde_json::Map::new())
    } else {
        sample
    }
}

fn response_sample(m: &MethodSpec) -> Value {
    m.response_schema.as_ref().map(sample_value).unwrap_or(Value::Null)
}

/// Success expression of a stub returning `ty`, built from `sample`
///
/// `serde_json::Value` returns the sample itself. Other types deserialise it
/// and fall back to `Default` when the type cannot hold it.
pub fn sample_ok_expr(ty: &str, sample: &Value) -> String {
    if ty == ANY_TYPE {
        format!("Ok({})", json_literal(sample))
    } else if is_empty_sample(sample) {
        "Ok(Default::default())".to_string()
    } else {
        format!(
            "Ok(match serde_json::from_value::<{ty}>({}) {{ Ok(v) => v, Err(_) => Default::default() }})",
            json_literal(sample)
        )
    }
}

/// Expression building a test payload of type `ty` from `sample`
pub fn sample_payload_expr(ty: &str, sample: &Value) -> String {
    if ty == ANY_TYPE {
        json_literal(sample)
    } else if is_empty_sample(sample) {
        "Default::default()".to_string()
    } else {
        format!(
            "serde_json::from_value({}).expect(\"sample payload should deserialise\")",
            json_literal(sample)
        )
    }
}

/// Stub handler view models in method-name order
pub fn handler_stubs(ctx: &RenderContext<'_>) -> Vec<HandlerStub> {
    ctx.result
        .iter_methods()
        .map(|m| {
            let params = if decodes_payload(ctx, m) {
                format!(
                    "_req: &Request<Vec<u8>>, _payload: {}",
                    ctx.request_type(&m.name).unwrap_or_default()
                )
            } else {
                "_req: &Request<Vec<u8>>".to_string()
            };
            let (return_type, ok_expr) = match ctx.response_type(&m.name) {
                Some(ty) => (ty.to_string(), sample_ok_expr(ty, &response_sample(m))),
                None => ("()".to_string(), "Ok(())".to_string()),
            };
            HandlerStub {
                summary: summary(m),
                name: m.stub_handler(),
                params,
                return_type,
                ok_expr,
            }
        })
        .collect()
}

/// Bare (unqualified) middleware and mutator names that need local stubs
///
/// Qualified paths such as `crate::auth::check` are expected to exist
/// elsewhere and are left alone.
pub fn hook_stubs(result: &ParseResult) -> (Vec<String>, Vec<String>) {
    let bare = |name: &&String| is_rust_path(name) && !name.contains("::");
    let middlewares: BTreeSet<String> = result
        .middlewares
        .iter()
        .chain(result.method_wrappers.values().flatten())
        .filter(bare)
        .cloned()
        .collect();
    let mutators: BTreeSet<String> = result
        .request_mutators
        .values()
        .flatten()
        .filter(bare)
        .cloned()
        .collect();
    (middlewares.into_iter().collect(), mutators.into_iter().collect())
}

fn render_validators(ctx: &RenderContext<'_>) -> anyhow::Result<String> {
    let validators = ctx.result.validators();
    let mut body = String::new();
    ctx.builder.generate_code(&mut body, &validators)?;
    let mut statics: Vec<String> = validators
        .iter()
        .map(|v| validator_static_ident(v.name()))
        .collect();
    statics.sort();
    Ok(ValidatorsTemplate {
        imports: render_imports(&ctx.imports_for(ArtifactKind::Validators)),
        body,
        statics,
    }
    .render()?)
}

/// Generated test view models in method-name order
pub fn test_cases(ctx: &RenderContext<'_>) -> Vec<TestCase> {
    ctx.result
        .iter_methods()
        .map(|m| {
            let payload_type = ctx.request_type(&m.name).unwrap_or_default().to_string();
            let payload = request_sample(m, &payload_type);
            let lossy = lossy_struct(&payload_type, &payload).or_else(|| {
                ctx.response_type(&m.name)
                    .and_then(|ty| lossy_struct(ty, &response_sample(m)))
            });
            let ignore_literal = lossy
                .map(|ty| {
                    string_literal(&format!(
                        "{ty} is a field-less stub in src/types.rs; add its fields to run this test"
                    ))
                })
                .unwrap_or_default();
            let files = file_fields(m);
            let mut args: Vec<String> = Vec::new();
            if !payload_type.is_empty() {
                args.push("&payload".to_string());
            }
            args.extend(files.iter().map(|f| format!("&{}", f.ident)));
            let response_validator = if ctx.response_type(&m.name).is_some()
                && ctx.result.response_validators.contains_key(&m.name)
            {
                validator_static_ident(&response_validator_name(&m.name))
            } else {
                String::new()
            };
            TestCase {
                method: m.name.clone(),
                name: format!("test_{}", m.snake_name()),
                client_method: sanitize_field_name(&m.snake_name()),
                payload_expr: sample_payload_expr(&payload_type, &payload),
                payload_type,
                files,
                args: args.join(", "),
                ignore_literal,
                response_validator,
            }
        })
        .collect()
}
