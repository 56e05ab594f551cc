//! # Generator Module
//!
//! The generator turns a parsed hyper-schema into a Rust crate: HTTP routes,
//! a blocking client, handler stubs, payload type stubs, validator
//! registration, an entry point, a manifest and end-to-end tests.
//!
//! ## Architecture
//!
//! Generation uses Askama templates with typed view models:
//!
//! ```text
//! Hyper-Schema → Parser → ParseResult → View Models → Templates → rustfmt → Files
//! ```
//!
//! 1. **Parser** - [`crate::parser::parse`] builds the [`crate::parser::ParseResult`]
//! 2. **View Models** - the `render` builders turn it into per-artifact data
//! 3. **Template Rendering** - each artifact kind has one template
//! 4. **Materialization** - text is formatted and written through the
//!    overwrite policy
//!
//! ## Generated Structure
//!
//! ```text
//! my-service/
//! ├── Cargo.toml          # user-owned
//! ├── src/
//! │   ├── lib.rs          # system-owned
//! │   ├── server.rs       # system-owned: routes, router, serve loop
//! │   ├── client.rs       # system-owned
//! │   ├── validators.rs   # system-owned
//! │   ├── handlers.rs     # user-owned: one stub per link
//! │   ├── types.rs        # user-owned: payload struct stubs
//! │   └── main.rs         # user-owned
//! └── tests/
//!     └── my_service.rs   # user-owned
//! ```
//!
//! System-owned files are regenerated whenever overwrite is on. User-owned
//! files are written once and only replaced when overwrite is on and their
//! kind is listed in `force`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hypergen::config::GeneratorConfig;
//! use hypergen::generator::generate_from_path;
//!
//! let config = GeneratorConfig {
//!     output_dir: "my-service".into(),
//!     ..GeneratorConfig::default()
//! };
//! let report = generate_from_path("schema.json".as_ref(), &config)?;
//! println!("{} files written", report.written());
//! ```
//!
//! ## Flavors
//!
//! - **server** - every artifact above
//! - **client** - `lib.rs`, the client and the payload types
//! - **validator** - `lib.rs` and the validators

mod artifact;
mod flavor;
pub mod naming;
mod project;
mod render;
mod sample;
mod templates;
#[cfg(test)]
mod tests;

pub use artifact::*;
pub use flavor::*;
pub use naming::{method_name, to_snake_case};
pub use project::*;
pub use render::*;
pub use sample::{json_literal, sample_value};
pub use templates::*;
