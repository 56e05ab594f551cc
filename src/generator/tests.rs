#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::naming::*;
use super::*;
use crate::error::SchemaError;
use crate::parser::{parse, ParseResult};
use crate::schema::HyperSchema;
use crate::validator::JsonSchemaBuilder;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

fn parsed(v: Value) -> ParseResult {
    let doc = HyperSchema::from_value(v).unwrap();
    parse(&doc, &JsonSchemaBuilder).unwrap()
}

fn context<'a>(result: &'a ParseResult, kinds: &[ArtifactKind]) -> RenderContext<'a> {
    RenderContext {
        result,
        builder: &JsonSchemaBuilder,
        package_name: "item-service".into(),
        names: ModuleNames {
            crate_ident: "item_service".into(),
            validators: "validators".into(),
            client: "client".into(),
        },
        kinds: kinds.iter().copied().collect(),
        max_body_bytes: 1024,
        imports: BTreeMap::new(),
        title: "Item Service".into(),
    }
}

fn item_schema() -> Value {
    json!({
        "title": "Item Service",
        "middlewares": "trace",
        "definitions": {
            "item": { "type": "object", "rusttype": "Item", "properties": { "id": { "type": "integer" } } }
        },
        "links": [
            {
                "title": "get item",
                "href": "/item",
                "schema": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "tags": { "type": "array", "items": { "type": "string" } }
                    }
                },
                "targetSchema": { "$ref": "#/definitions/item" }
            },
            {
                "title": "post item",
                "method": "POST",
                "href": "/item",
                "schema": { "$ref": "#/definitions/item" },
                "wrapper": ["auth", "log"],
                "cors": "*",
                "mutators": "normalize"
            },
            {
                "title": "upload avatar",
                "method": "POST",
                "href": "/avatar",
                "encType": "multipart/form-data",
                "files": ["avatar"]
            }
        ]
    })
}

#[test]
fn test_method_name() {
    assert_eq!(method_name("get item"), "GetItem");
    assert_eq!(method_name("list all users"), "ListAllUsers");
    assert_eq!(method_name("getItem"), "GetItem");
    assert_eq!(method_name("2fa verify"), "_2faVerify");
    assert_eq!(method_name("   "), "");
}

#[test]
fn test_snake_case() {
    assert_eq!(to_snake_case("GetItem"), "get_item");
    assert_eq!(to_snake_case("HTTPGetItemRequest"), "http_get_item_request");
    assert_eq!(to_snake_case("ListV2Items"), "list_v2_items");
    assert_eq!(to_screaming_snake_case("PostItem"), "POST_ITEM");
}

#[test]
fn test_struct_type_name() {
    assert_eq!(struct_type_name("Item"), Some("Item".into()));
    assert_eq!(struct_type_name("Vec<Item>"), Some("Item".into()));
    assert_eq!(struct_type_name("Option<Box<Item>>"), Some("Item".into()));
    assert_eq!(struct_type_name(ANY_TYPE), None);
    assert_eq!(struct_type_name(MAP_TYPE), None);
    assert_eq!(struct_type_name("String"), None);
    assert_eq!(struct_type_name("Vec<u8>"), None);
    assert_eq!(struct_type_name("crate::models::Item"), None);
    assert!(!is_struct_type("HashMap<String, Item>"));
}

#[test]
fn test_identifier_predicates() {
    assert!(is_rust_path("auth"));
    assert!(is_rust_path("crate::mw::auth"));
    assert!(!is_rust_path("auth()"));
    assert!(!is_rust_path("a::"));
    assert!(is_use_tree("crate::mw::{auth, log}"));
    assert!(is_use_tree("crate::mw::*"));
    assert!(!is_use_tree("use crate::mw;"));
    assert_eq!(sanitize_field_name("Content-Type"), "content_type");
    assert_eq!(sanitize_field_name("type"), "r#type");
    assert_eq!(sanitize_field_name("9lives"), "_9lives");
}

#[test]
fn test_render_imports_sorted_and_deduplicated() {
    let paths: BTreeSet<String> = ["crate::b", "crate::a", "crate::b"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(render_imports(&paths), "use crate::a;\nuse crate::b;\n");
}

#[test]
fn test_raw_string_literal_escapes_hashes() {
    assert_eq!(raw_string_literal("plain"), "r#\"plain\"#");
    assert_eq!(raw_string_literal("a\"#b"), "r##\"a\"#b\"##");
}

#[test]
fn test_query_fields_types() {
    let fields = query_fields(
        "ListItems",
        &json!({ "properties": {
            "id": { "type": "integer" },
            "ids": { "type": "array", "items": { "type": "integer" } },
            "q": {}
        }}),
    )
    .unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name_literal, "\"id\"");
    assert_eq!(fields[0].kind_literal, "\"integer\"");
    assert_eq!(fields[0].items_literal, "None");
    assert_eq!(fields[1].items_literal, "Some(\"integer\")");
    assert_eq!(fields[2].kind_literal, "\"string\"");
}

#[test]
fn test_query_fields_reject_multi_typed_property() {
    let err = query_fields(
        "ListItems",
        &json!({ "properties": { "id": { "type": ["integer", "string"] } } }),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::MultiTypedProperty {
            method: "ListItems".into(),
            property: "id".into()
        }
    );
}

#[test]
fn test_multi_typed_body_property_is_allowed() {
    let result = parsed(json!({
        "links": [{ "title": "post item", "method": "POST", "href": "/i",
                    "schema": { "properties": { "id": { "type": ["integer", "string"] } } } }]
    }));
    let ctx = context(&result, &[ArtifactKind::Server]);
    assert!(server_routes(&ctx).is_ok());
}

#[test]
fn test_wrap_handler_order() {
    let chain = vec!["auth".to_string(), "log".to_string()];
    assert_eq!(wrap_handler("http_post_item", &chain), "log(auth(http_post_item))");
    assert_eq!(wrap_handler("h", &[]), "h");
}

#[test]
fn test_route_registrations_sorted_with_globals_outermost() {
    let result = parsed(item_schema());
    let regs = route_registrations(&result);
    let paths: Vec<_> = regs.iter().map(|r| r.path_literal.as_str()).collect();
    assert_eq!(paths, vec!["\"/avatar\"", "\"/item\""]);
    // `/item` is declared twice; the POST link comes last and wins
    assert_eq!(regs[1].expr, "trace(log(auth(http_post_item)))");
    assert_eq!(regs[0].expr, "trace(http_upload_avatar)");
}

#[test]
fn test_server_routes_shape() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Server]);
    let routes = server_routes(&ctx).unwrap();
    let names: Vec<_> = routes.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(names, vec!["GetItem", "PostItem", "UploadAvatar"]);

    let get = &routes[0];
    assert!(get.query_bound && !get.query_from_body);
    assert_eq!(get.fields.len(), 2);
    assert_eq!(get.payload_type, MAP_TYPE);
    assert_eq!(get.request_validator, "HTTP_GET_ITEM_REQUEST");
    assert!(get.has_response);

    let post = &routes[1];
    assert!(post.has_payload && !post.query_bound);
    assert_eq!(post.payload_type, "Item");
    assert_eq!(post.mutators, vec!["normalize"]);
    assert_eq!(post.cors_literal, "\"*\"");
    assert!(!post.has_response);
    assert_eq!(post.stub_args, "req, payload");

    let upload = &routes[2];
    assert!(!upload.has_payload);
    assert_eq!(upload.stub_args, "req");
}

#[test]
fn test_client_methods_encoding() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Client]);
    let methods = client_methods(&ctx);
    assert!(methods[0].query && !methods[0].json);
    assert_eq!(methods[0].return_type, "Item");
    assert!(methods[1].json);
    assert_eq!(methods[1].params, ", payload: &Item");
    assert_eq!(methods[1].return_type, "()");
    assert!(methods[2].multipart);
    assert_eq!(methods[2].params, ", avatar: &std::path::Path");
}

#[test]
fn test_handler_stubs_and_hooks() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Handlers]);
    let stubs = handler_stubs(&ctx);
    assert_eq!(stubs[0].name, "do_get_item");
    assert_eq!(stubs[0].params, format!("_req: &Request<Vec<u8>>, _payload: {MAP_TYPE}"));
    assert_eq!(stubs[0].ok_expr, "Ok(Default::default())");
    assert_eq!(stubs[1].ok_expr, "Ok(())");
    let (middlewares, mutators) = hook_stubs(&result);
    assert_eq!(middlewares, vec!["auth", "log", "trace"]);
    assert_eq!(mutators, vec!["normalize"]);
}

#[test]
fn test_untyped_response_is_any_and_not_declared() {
    let result = parsed(json!({
        "links": [{ "title": "get thing", "href": "/thing", "targetSchema": { "type": "object" } }]
    }));
    assert_eq!(result.response_payload_type["GetThing"], ANY_TYPE);
    let ctx = context(&result, &[ArtifactKind::Types]);
    let types = render_artifact(ArtifactKind::Types, &ctx).unwrap();
    assert!(!types.contains("pub struct"));
}

#[test]
fn test_types_file_declares_struct_types_once() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Types]);
    let types = render_artifact(ArtifactKind::Types, &ctx).unwrap();
    assert_eq!(types.matches("pub struct Item {}").count(), 1);
}

#[test]
fn test_server_source_contains_query_binding_and_chain() {
    let result = parsed(item_schema());
    let ctx = context(&result, &ArtifactKind::ALL);
    let server = render_artifact(ArtifactKind::Server, &ctx).unwrap();
    assert!(server.contains("pub fn http_get_item(req: &Request<Vec<u8>>) -> Response<Vec<u8>>"));
    assert!(server.contains("bind_param(&query, \"id\", \"integer\", None)"));
    assert!(server.contains("Err(e) => return error_response(StatusCode::BAD_REQUEST, &e)"));
    assert!(server.contains("Box::new(trace(log(auth(http_post_item))))"));
    assert!(server.contains("normalize(&mut payload);"));
    assert!(server.contains("validators::HTTP_GET_ITEM_REQUEST.validate(&payload)"));
    assert!(server.contains("pub const MAX_BODY_BYTES: usize = 1024;"));
    assert!(server.contains("HeaderValue::from_str(\"*\")"));
}

#[test]
fn test_validators_file_lists_every_static() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Validators]);
    let text = render_artifact(ArtifactKind::Validators, &ctx).unwrap();
    assert!(text.contains("use std::sync::OnceLock;"));
    for ident in [
        "HTTP_GET_ITEM_REQUEST",
        "HTTP_GET_ITEM_RESPONSE",
        "HTTP_POST_ITEM_REQUEST",
    ] {
        assert!(text.contains(&format!("pub static {ident}: SchemaValidator")));
        assert!(text.contains(&format!("&{ident},")));
    }
}

#[test]
fn test_lib_and_manifest_follow_kinds() {
    let result = parsed(item_schema());
    let ctx = context(&result, &[ArtifactKind::Lib, ArtifactKind::Client, ArtifactKind::Types]);
    assert_eq!(lib_modules(&ctx), vec!["client", "types"]);
    let lib = render_artifact(ArtifactKind::Lib, &ctx).unwrap();
    assert!(lib.contains("pub mod client;"));
    assert!(!lib.contains("pub mod server;"));

    let ctx = context(&result, &ArtifactKind::ALL);
    let manifest = render_artifact(ArtifactKind::Manifest, &ctx).unwrap();
    assert!(manifest.contains("name = \"item-service\""));
    assert!(manifest.contains("tiny_http"));
    assert!(manifest.contains("reqwest"));
    assert!(manifest.contains("jsonschema"));
}

#[test]
fn test_tests_scaffold_checks_response_validator() {
    let result = parsed(item_schema());
    let ctx = context(&result, &ArtifactKind::ALL);
    let cases = test_cases(&ctx);
    assert_eq!(cases[0].name, "test_get_item");
    assert_eq!(cases[0].response_validator, "HTTP_GET_ITEM_RESPONSE");
    assert_eq!(cases[0].args, "&payload");
    assert!(cases[1].response_validator.is_empty());
    assert_eq!(cases[2].args, "&avatar");
    let text = render_artifact(ArtifactKind::Tests, &ctx).unwrap();
    assert!(text.contains("use item_service::client::Client;"));
    assert!(text.contains("fn upload_fixture"));
}

#[test]
fn test_render_is_deterministic() {
    let a = parsed(item_schema());
    let b = parsed(item_schema());
    for kind in ArtifactKind::ALL {
        let left = render_artifact(kind, &context(&a, &ArtifactKind::ALL)).unwrap();
        let right = render_artifact(kind, &context(&b, &ArtifactKind::ALL)).unwrap();
        assert_eq!(left, right, "{kind} differs between runs");
    }
}

fn required_schema() -> Value {
    json!({
        "definitions": {
            "item": {
                "type": "object",
                "rusttype": "Item",
                "properties": { "id": { "type": "integer" }, "name": { "type": "string" } },
                "required": ["id"]
            }
        },
        "links": [
            {
                "title": "get item",
                "href": "/item",
                "schema": { "type": "object", "properties": { "id": { "type": "integer" } }, "required": ["id"] },
                "targetSchema": { "type": "object", "properties": { "id": { "type": "integer" } }, "required": ["id"] }
            },
            {
                "title": "post item",
                "method": "POST",
                "href": "/item/create",
                "schema": { "$ref": "#/definitions/item" }
            }
        ]
    })
}

#[test]
fn test_tests_scaffold_sends_required_fields() {
    let result = parsed(required_schema());
    let ctx = context(&result, &ArtifactKind::ALL);
    let cases = test_cases(&ctx);
    assert_eq!(cases[0].method, "GetItem");
    assert_eq!(
        cases[0].payload_expr,
        r#"serde_json::from_value(serde_json::json!({ "id": 1 })).expect("sample payload should deserialise")"#
    );
    assert!(cases[0].ignore_literal.is_empty());
    assert_eq!(cases[1].method, "PostItem");
    assert!(cases[1].ignore_literal.contains("Item is a field-less stub"));

    let text = render_artifact(ArtifactKind::Tests, &ctx).unwrap();
    assert!(text.contains(r#"serde_json::json!({ "id": 1 })"#));
    assert_eq!(text.matches("#[ignore = \"Item is a field-less stub").count(), 1);
}

#[test]
fn test_stubs_return_schema_samples() {
    let result = parsed(required_schema());
    let ctx = context(&result, &[ArtifactKind::Handlers]);
    let stubs = handler_stubs(&ctx);
    assert_eq!(stubs[0].ok_expr, r#"Ok(serde_json::json!({ "id": 1 }))"#);
    assert_eq!(
        sample_ok_expr("Item", &json!({ "id": 1 })),
        r#"Ok(match serde_json::from_value::<Item>(serde_json::json!({ "id": 1 })) { Ok(v) => v, Err(_) => Default::default() })"#
    );
    assert_eq!(sample_ok_expr("Vec<Item>", &json!([])), "Ok(Default::default())");
    assert_eq!(sample_payload_expr("String", &Value::Null), "Default::default()");
    assert_eq!(sample_payload_expr(ANY_TYPE, &Value::Null), "serde_json::json!(null)");
}
