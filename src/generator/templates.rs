use askama::Template;

/// One query/form parameter bound by a server route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    /// Property name as a string literal
    pub name_literal: String,
    /// JSON type of the property as a string literal (`"integer"`)
    pub kind_literal: String,
    /// `None` for scalars, `Some("<item type>")` for arrays
    pub items_literal: String,
}

/// View model for one generated route handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRoute {
    /// Method name, e.g. `GetItem`
    pub method: String,
    /// `GET /item`
    pub summary: String,
    /// Route handler name (`http_get_item`)
    pub handler: String,
    /// Stub handler name (`do_get_item`)
    pub stub: String,
    /// `http::Method` constant name
    pub verb: String,
    /// Whether a payload is decoded and passed to the stub
    pub has_payload: bool,
    /// Payload rebuilt from query/form parameters
    pub query_bound: bool,
    /// Query parameters come from the request body (form encoded, non-GET)
    pub query_from_body: bool,
    /// Properties bound from the query
    pub fields: Vec<QueryField>,
    /// Mutator paths, applied in order
    pub mutators: Vec<String>,
    /// Request validator static, empty when there is none
    pub request_validator: String,
    /// Rust payload type
    pub payload_type: String,
    /// Whether the stub returns a response body
    pub has_response: bool,
    /// CORS origin string literal, empty when unset
    pub cors_literal: String,
    /// Stub call arguments (`req, payload`)
    pub stub_args: String,
}

/// One path registration in the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistration {
    /// URL path as a string literal
    pub path_literal: String,
    /// Handler expression with the middleware chain applied
    pub expr: String,
}

/// Template for `src/server.rs`
#[derive(Template)]
#[template(path = "server.rs.txt", escape = "none")]
pub struct ServerTemplate {
    /// `use` block
    pub imports: String,
    /// Module holding the validators
    pub validator_module: String,
    /// JSON body limit
    pub max_body_bytes: usize,
    /// Route handlers in method-name order
    pub routes: Vec<ServerRoute>,
    /// Registrations in path order
    pub registrations: Vec<RouteRegistration>,
}

/// Multipart file field of a client method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// Form field name as a string literal
    pub name_literal: String,
    /// Rust parameter name
    pub ident: String,
}

/// View model for one client method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMethod {
    /// `GET /item`
    pub summary: String,
    /// Method identifier (`get_item`)
    pub name: String,
    /// `reqwest::Method` constant name
    pub verb: String,
    /// Link path as a string literal
    pub path_literal: String,
    /// Parameter list after `&self`
    pub params: String,
    /// Payload sent as URL query
    pub query: bool,
    /// Payload sent as a url-encoded form body
    pub form: bool,
    /// Payload sent as a JSON body
    pub json: bool,
    /// Payload and files sent as multipart
    pub multipart: bool,
    /// Whether a payload parameter exists
    pub has_payload: bool,
    /// Upload fields
    pub files: Vec<FileField>,
    /// Success type
    pub return_type: String,
    /// Whether the response body is decoded
    pub has_response: bool,
}

/// Template for the client module
#[derive(Template)]
#[template(path = "client.rs.txt", escape = "none")]
pub struct ClientTemplate {
    /// `use` block
    pub imports: String,
    /// Client methods in method-name order
    pub methods: Vec<ClientMethod>,
}

/// View model for one stub handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerStub {
    /// `GET /item`
    pub summary: String,
    /// Stub handler name (`do_get_item`)
    pub name: String,
    /// Parameter list
    pub params: String,
    /// Success type
    pub return_type: String,
    /// Placeholder success expression
    pub ok_expr: String,
}

/// Template for `src/handlers.rs`
#[derive(Template)]
#[template(path = "handlers.rs.txt", escape = "none")]
pub struct HandlersTemplate {
    /// `use` block
    pub imports: String,
    /// Stubs in method-name order
    pub stubs: Vec<HandlerStub>,
    /// Bare middleware identifiers that get pass-through stubs
    pub middlewares: Vec<String>,
    /// Bare mutator identifiers that get no-op stubs
    pub mutators: Vec<String>,
}

/// Template for `src/types.rs`
#[derive(Template)]
#[template(path = "types.rs.txt", escape = "none")]
pub struct TypesTemplate {
    /// `use` block
    pub imports: String,
    /// Struct names, sorted
    pub types: Vec<String>,
}

/// Template for the validator registration module
#[derive(Template)]
#[template(path = "validators.rs.txt", escape = "none")]
pub struct ValidatorsTemplate {
    /// `use` block
    pub imports: String,
    /// Code emitted by the validator builder
    pub body: String,
    /// Static identifiers, sorted
    pub statics: Vec<String>,
}

/// One generated integration test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Method name, e.g. `GetItem`
    pub method: String,
    /// Test function name
    pub name: String,
    /// Client method to call
    pub client_method: String,
    /// Payload type, empty when the method takes none
    pub payload_type: String,
    /// Expression building the sample payload
    pub payload_expr: String,
    /// Upload fields
    pub files: Vec<FileField>,
    /// Call arguments
    pub args: String,
    /// Response validator static, empty when there is none
    pub response_validator: String,
    /// `#[ignore]` reason as a string literal, empty when the test runs
    pub ignore_literal: String,
}

/// Template for `tests/<crate>.rs`
#[derive(Template)]
#[template(path = "tests.rs.txt", escape = "none")]
pub struct TestsTemplate {
    /// Crate identifier of the generated package
    pub crate_ident: String,
    /// Client module name
    pub client_module: String,
    /// Validator module name
    pub validator_module: String,
    /// Whether any case uploads files
    pub has_uploads: bool,
    /// `use` block
    pub imports: String,
    /// Tests in method-name order
    pub cases: Vec<TestCase>,
}

/// Template for `src/main.rs`
#[derive(Template)]
#[template(path = "main.rs.txt", escape = "none")]
pub struct MainTemplate {
    /// Crate identifier of the generated package
    pub crate_ident: String,
    /// Environment variable holding the listen address
    pub addr_env: String,
    /// `use` block
    pub imports: String,
}

/// Template for `src/lib.rs`
#[derive(Template)]
#[template(path = "lib.rs.txt", escape = "none")]
pub struct LibTemplate {
    /// Document title
    pub title: String,
    /// Declared modules, sorted
    pub modules: Vec<String>,
    /// `use` block
    pub imports: String,
}

/// Template for the generated `Cargo.toml`
#[derive(Template)]
#[template(path = "Cargo.toml.txt", escape = "none")]
pub struct CargoTomlTemplate {
    /// Package name
    pub package_name: String,
    /// Whether the server module is generated
    pub server: bool,
    /// Whether the client module is generated
    pub client: bool,
    /// Whether the validator module is generated
    pub validators: bool,
}
