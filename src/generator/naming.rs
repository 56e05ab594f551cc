use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Placeholder type for payloads without a declared type
pub const ANY_TYPE: &str = "serde_json::Value";

/// Placeholder type for query-bound (GET / form-encoded) payloads
pub const MAP_TYPE: &str = "serde_json::Map<String, serde_json::Value>";

static RUST_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("Rust path regex should be valid")
});

static USE_TREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::([A-Za-z_][A-Za-z0-9_]*|\*|\{[A-Za-z0-9_:,\s\*]+\}))*$")
        .expect("use tree regex should be valid")
});

static RUST_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_:<>,\s\[\]&']*$").expect("type regex should be valid")
});

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn",
];

const PRIMITIVES: &[&str] = &[
    "String", "str", "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Value",
];

/// Derive a method name from a link title
///
/// Upper-cases the first letter of each whitespace-separated word and
/// concatenates the words. Characters that cannot appear in an identifier
/// are dropped. A result starting with a digit gets a leading `_`.
///
/// # Example
///
/// ```rust
/// use hypergen::generator::method_name;
/// assert_eq!(method_name("get item"), "GetItem");
/// assert_eq!(method_name("  list  all-users "), "ListAllusers");
/// ```
pub fn method_name(title: &str) -> String {
    let name: String = title
        .split_whitespace()
        .map(|w| {
            let cleaned: String = w
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            let mut chars = cleaned.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Convert a CamelCase identifier to snake_case
///
/// Acronym runs stay together: `HTTPGetItem` becomes `http_get_item`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { chars.get(i - 1) } else { None };
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a CamelCase identifier to SCREAMING_SNAKE_CASE
pub fn to_screaming_snake_case(name: &str) -> String {
    to_snake_case(name).to_ascii_uppercase()
}

/// Name of the request validator for a method (`HTTPGetItemRequest`)
pub fn request_validator_name(method: &str) -> String {
    format!("HTTP{method}Request")
}

/// Name of the response validator for a method (`HTTPGetItemResponse`)
pub fn response_validator_name(method: &str) -> String {
    format!("HTTP{method}Response")
}

/// Escape Rust keywords with a raw identifier prefix
pub fn sanitize_rust_identifier(name: &str) -> String {
    if matches!(name, "self" | "Self" | "super" | "crate") {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Turn an arbitrary field name into a valid Rust identifier
pub fn sanitize_field_name(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        s = "_".to_string();
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    sanitize_rust_identifier(&s)
}

/// Whether `value` is a Rust path such as `auth` or `crate::mw::auth`
pub fn is_rust_path(value: &str) -> bool {
    RUST_PATH.is_match(value)
}

/// Whether `value` is a `use` tree such as `crate::mw::{auth, log}`
pub fn is_use_tree(value: &str) -> bool {
    USE_TREE.is_match(value)
}

/// Whether `value` can stand in type position
pub fn is_rust_type(value: &str) -> bool {
    RUST_TYPE.is_match(value.trim())
}

/// Name of the struct a payload type refers to, if it looks like one
///
/// Unwraps `Vec<..>`, `Option<..>` and `Box<..>` and returns the inner
/// name when it is a bare, capitalised, non-primitive identifier. Paths,
/// maps, `serde_json::Value` and primitives yield `None`.
pub fn struct_type_name(ty: &str) -> Option<String> {
    let mut inner = ty.trim();
    loop {
        let unwrapped = ["Vec<", "Option<", "Box<"]
            .iter()
            .find_map(|p| inner.strip_prefix(p).and_then(|s| s.strip_suffix('>')));
        match unwrapped {
            Some(s) => inner = s.trim(),
            None => break,
        }
    }
    let bare = inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare && inner.starts_with(|c: char| c.is_ascii_uppercase()) && !PRIMITIVES.contains(&inner) {
        Some(inner.to_string())
    } else {
        None
    }
}

/// Whether a payload type looks like a struct the author should declare
pub fn is_struct_type(ty: &str) -> bool {
    struct_type_name(ty).is_some()
}

/// Render a block of `use` statements, one per line, in sorted order
pub fn render_imports(paths: &BTreeSet<String>) -> String {
    paths
        .iter()
        .map(|p| format!("use {};\n", p.trim().trim_start_matches("use ").trim_end_matches(';')))
        .collect()
}

/// Quote `s` as a Rust raw string literal with enough `#`s to be unambiguous
pub fn raw_string_literal(s: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in s.chars() {
        run = match (run, c) {
            (_, '"') => Some(0),
            (Some(n), '#') => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n);
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{s}\"{hashes}")
}

/// Quote `s` as a regular Rust string literal
pub fn string_literal(s: &str) -> String {
    format!("{s:?}")
}
