use hypergen::parser::parse;
use hypergen::schema::{load_schema, HyperSchema};
use hypergen::validator::{JsonSchemaBuilder, ValidatorBuilder, ValidatorHandle};
use hypergen::SchemaError;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn doc(v: Value) -> HyperSchema {
    HyperSchema::from_value(v).unwrap()
}

fn schema_error(v: Value) -> SchemaError {
    let err = parse(&doc(v), &JsonSchemaBuilder).unwrap_err();
    err.downcast_ref::<SchemaError>()
        .cloned()
        .unwrap_or_else(|| panic!("expected a schema error, got {err:#}"))
}

#[test]
fn test_fixture_method_names_sorted() {
    let schema = load_schema(&fixture("items.json")).unwrap();
    let result = parse(&schema, &JsonSchemaBuilder).unwrap();
    assert_eq!(
        result.method_names,
        vec!["GetItem", "ListItems", "PostItem", "UploadAvatar"]
    );
    assert_eq!(result.slug, "item_service");
    assert_eq!(result.response_payload_type["ListItems"], "Vec<Item>");
    assert_eq!(result.method_wrappers["PostItem"], vec!["auth", "log"]);
    assert_eq!(result.request_cors["PostItem"], "*");
    assert_eq!(result.methods["UploadAvatar"].files, vec!["avatar"]);
    assert!(result.methods["UploadAvatar"].is_multipart());
}

#[test]
fn test_yaml_fixture_parses() {
    let schema = load_schema(&fixture("items.yaml")).unwrap();
    let result = parse(&schema, &JsonSchemaBuilder).unwrap();
    assert_eq!(result.method_names, vec!["GetItem"]);
    assert_eq!(result.response_payload_type["GetItem"], "Item");
}

#[test]
fn test_names_deduplicated_and_sorted() {
    let result = parse(
        &doc(json!({
            "links": [
                { "title": "zap", "href": "/zap" },
                { "title": "get item", "href": "/old" },
                { "title": "alpha", "href": "/alpha" },
                { "title": "get  item", "href": "/new" }
            ]
        })),
        &JsonSchemaBuilder,
    )
    .unwrap();
    assert_eq!(result.method_names, vec!["Alpha", "GetItem", "Zap"]);
    // the later link replaced the earlier one, including its route
    assert_eq!(result.methods["GetItem"].path, "/new");
    assert!(!result.path_to_methods.contains_key("/old"));
}

#[test]
fn test_uri_template_path_fails() {
    let err = schema_error(json!({
        "links": [
            { "title": "ok", "href": "/ok" },
            { "title": "get item", "href": "/items/{id}" }
        ]
    }));
    assert_eq!(
        err,
        SchemaError::UriTemplatePath {
            method: "GetItem".into(),
            path: "/items/{id}".into()
        }
    );
}

#[test]
fn test_missing_title_fails() {
    assert_eq!(
        schema_error(json!({ "links": [{ "title": "a", "href": "/a" }, { "href": "/b" }] })),
        SchemaError::MissingTitle { index: 1 }
    );
    assert_eq!(
        schema_error(json!({ "links": [{ "title": "  ", "href": "/b" }] })),
        SchemaError::MissingTitle { index: 0 }
    );
}

#[test]
fn test_extra_shape_mismatch_fails() {
    let err = schema_error(json!({
        "links": [{ "title": "post item", "method": "POST", "href": "/i", "mutators": { "x": 1 } }]
    }));
    assert!(matches!(
        err,
        SchemaError::ExtraShape { ref method, ref key, .. } if method == "PostItem" && key == "mutators"
    ));
}

#[test]
fn test_unresolved_ref_fails() {
    let err = schema_error(json!({
        "links": [{ "title": "get item", "href": "/i", "targetSchema": { "$ref": "#/definitions/missing" } }]
    }));
    assert!(matches!(err, SchemaError::UnresolvedRef { .. }));
}

#[test]
fn test_duplicate_path_last_wins() {
    let result = parse(
        &doc(json!({
            "links": [
                { "title": "first", "href": "/same" },
                { "title": "second", "method": "POST", "href": "same" }
            ]
        })),
        &JsonSchemaBuilder,
    )
    .unwrap();
    assert_eq!(result.path_to_methods.len(), 1);
    assert_eq!(result.path_to_methods["/same"], "Second");
    // the earlier method keeps its handler but is no longer routed
    assert!(result.methods.contains_key("First"));
    assert_eq!(result.routes().count(), 1);
}

#[test]
fn test_validator_names_are_deterministic() {
    let result = parse(&load_schema(&fixture("items.json")).unwrap(), &JsonSchemaBuilder).unwrap();
    let names: Vec<&str> = result.validators().iter().map(|v| v.name()).collect();
    assert_eq!(
        names,
        vec![
            "HTTPGetItemRequest",
            "HTTPListItemsRequest",
            "HTTPPostItemRequest",
            "HTTPGetItemResponse",
            "HTTPListItemsResponse",
            "HTTPPostItemResponse",
        ]
    );
}

#[derive(Debug)]
struct Recorded {
    name: String,
    schema: Value,
}

impl ValidatorHandle for Recorded {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Value {
        &self.schema
    }
}

/// Records every schema it is handed and emits nothing.
#[derive(Default)]
struct RecordingBuilder {
    seen: RefCell<Vec<(String, Value)>>,
}

impl ValidatorBuilder for RecordingBuilder {
    fn build(&self, name: &str, schema: &Value, _root: &Value) -> anyhow::Result<Box<dyn ValidatorHandle>> {
        self.seen.borrow_mut().push((name.to_string(), schema.clone()));
        Ok(Box::new(Recorded {
            name: name.to_string(),
            schema: schema.clone(),
        }))
    }

    fn generate_code(&self, _out: &mut String, _validators: &[&dyn ValidatorHandle]) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_builder_receives_resolved_schemas() {
    let builder = RecordingBuilder::default();
    parse(
        &doc(json!({
            "definitions": { "id": { "type": "integer" } },
            "links": [{
                "title": "get item",
                "href": "/i",
                "schema": { "properties": { "id": { "$ref": "#/definitions/id" } } }
            }]
        })),
        &builder,
    )
    .unwrap();
    let seen = builder.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "HTTPGetItemRequest");
    assert_eq!(seen[0].1["properties"]["id"]["type"], "integer");
}

#[test]
fn test_invalid_schema_fails_in_builder() {
    let err = parse(
        &doc(json!({
            "links": [{ "title": "get item", "href": "/i", "schema": { "type": 5 } }]
        })),
        &JsonSchemaBuilder,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("GetItem"));
}
