//! # Validator Builder
//!
//! The generator does not validate payloads itself. It hands every resolved
//! request/response schema to a [`ValidatorBuilder`], stores the returned
//! [`ValidatorHandle`] in the parse result, and later asks the same builder
//! to emit the code that registers those validators in the generated crate.
//!
//! [`JsonSchemaBuilder`] is the default builder. It compiles each schema with
//! the `jsonschema` crate at generation time (so broken schemas fail early)
//! and emits a `SchemaValidator` static per handle that compiles the embedded
//! schema on first use in the generated service.
//!
//! ## Generated code contract
//!
//! Whatever [`ValidatorBuilder::generate_code`] emits must define a
//! `SchemaValidator` type with `fn name(&self) -> &'static str` and
//! `fn validate(&self, &serde_json::Value) -> Result<(), String>`, plus one
//! `pub static` per handle named by [`validator_static_ident`].

use anyhow::Context;
use askama::Template;
use serde_json::Value;
use std::fmt;

use crate::generator::naming::{raw_string_literal, string_literal, to_screaming_snake_case};

/// Opaque result of compiling a JSON Schema subtree
pub trait ValidatorHandle: fmt::Debug + Send + Sync {
    /// Deterministic validator name, e.g. `HTTPGetItemRequest`
    fn name(&self) -> &str;

    /// The resolved schema the validator checks against
    fn schema(&self) -> &Value;
}

/// Turns resolved schemas into validator handles and emits their code
pub trait ValidatorBuilder {
    /// Compile `schema` (already resolved against `root`) into a handle named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be compiled.
    fn build(&self, name: &str, schema: &Value, root: &Value)
        -> anyhow::Result<Box<dyn ValidatorHandle>>;

    /// Append the Rust code that defines every validator in `validators` to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle cannot be serialised.
    fn generate_code(&self, out: &mut String, validators: &[&dyn ValidatorHandle])
        -> anyhow::Result<()>;
}

/// Rust identifier of the static that holds a validator
///
/// `HTTPGetItemRequest` becomes `HTTP_GET_ITEM_REQUEST`.
pub fn validator_static_ident(name: &str) -> String {
    to_screaming_snake_case(name)
}

/// Validator handle produced by [`JsonSchemaBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaHandle {
    name: String,
    schema: Value,
}

impl ValidatorHandle for JsonSchemaHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Value {
        &self.schema
    }
}

/// Default builder backed by the `jsonschema` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaBuilder;

/// One `pub static` in the generated validators file
#[derive(Debug, Clone)]
pub struct ValidatorStatic {
    /// Validator name as a string literal
    pub name_literal: String,
    /// Rust identifier of the static
    pub ident: String,
    /// Schema JSON as a raw string literal
    pub schema_literal: String,
}

/// Template for the validator support type and statics
#[derive(Template)]
#[template(path = "validator_statics.rs.txt", escape = "none")]
pub struct ValidatorStaticsTemplate {
    /// Statics in name order
    pub statics: Vec<ValidatorStatic>,
}

impl ValidatorBuilder for JsonSchemaBuilder {
    fn build(
        &self,
        name: &str,
        schema: &Value,
        _root: &Value,
    ) -> anyhow::Result<Box<dyn ValidatorHandle>> {
        jsonschema::validator_for(schema)
            .map_err(|e| anyhow::anyhow!("{name}: invalid JSON schema: {e}"))?;
        Ok(Box::new(JsonSchemaHandle {
            name: name.to_string(),
            schema: schema.clone(),
        }))
    }

    fn generate_code(
        &self,
        out: &mut String,
        validators: &[&dyn ValidatorHandle],
    ) -> anyhow::Result<()> {
        let mut statics = Vec::with_capacity(validators.len());
        for v in validators {
            let json = serde_json::to_string(v.schema())
                .with_context(|| format!("Failed to serialise schema for {}", v.name()))?;
            statics.push(ValidatorStatic {
                name_literal: string_literal(v.name()),
                ident: validator_static_ident(v.name()),
                schema_literal: raw_string_literal(&json),
            });
        }
        statics.sort_by(|a, b| a.ident.cmp(&b.ident));
        ValidatorStaticsTemplate { statics }.render_into(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_ident() {
        assert_eq!(validator_static_ident("HTTPGetItemRequest"), "HTTP_GET_ITEM_REQUEST");
        assert_eq!(validator_static_ident("HTTPPostItemResponse"), "HTTP_POST_ITEM_RESPONSE");
    }

    #[test]
    fn test_build_rejects_invalid_schema() {
        let builder = JsonSchemaBuilder;
        let bad = json!({ "type": 12 });
        assert!(builder.build("HTTPXRequest", &bad, &json!({})).is_err());
        let good = json!({ "type": "object" });
        let handle = builder.build("HTTPXRequest", &good, &json!({})).unwrap();
        assert_eq!(handle.name(), "HTTPXRequest");
        assert_eq!(handle.schema(), &good);
    }

    #[test]
    fn test_generate_code_embeds_schemas_in_order() {
        let builder = JsonSchemaBuilder;
        let b = builder
            .build("HTTPBetaRequest", &json!({ "type": "string" }), &json!({}))
            .unwrap();
        let a = builder
            .build("HTTPAlphaRequest", &json!({ "pattern": "\"#" }), &json!({}))
            .unwrap();
        let mut out = String::new();
        builder
            .generate_code(&mut out, &[b.as_ref(), a.as_ref()])
            .unwrap();
        assert!(out.contains("pub struct SchemaValidator"));
        let a_pos = out.find("pub static HTTP_ALPHA_REQUEST").unwrap();
        let b_pos = out.find("pub static HTTP_BETA_REQUEST").unwrap();
        assert!(a_pos < b_pos);
        assert!(out.contains(r###"r##"{"pattern":"\"#"}"##"###));
    }
}
