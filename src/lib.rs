//! # hypergen
//!
//! Generates Rust HTTP servers, clients and payload validators from a JSON
//! Hyper-Schema document.
//!
//! The pipeline is a single synchronous pass:
//!
//! ```text
//! load_schema → parse → ParseResult → render (per artifact) → rustfmt → write
//! ```
//!
//! - [`schema`] loads the document and resolves `$ref`s
//! - [`parser`] builds the [`parser::ParseResult`] model
//! - [`validator`] is the seam to the validator builder
//! - [`generator`] renders and writes the artifacts
//!
//! ## Example
//!
//! ```rust,no_run
//! use hypergen::config::GeneratorConfig;
//! use hypergen::generator::generate_from_path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GeneratorConfig {
//!     output_dir: "pet-store".into(),
//!     ..GeneratorConfig::default()
//! };
//! let report = generate_from_path("schema.json".as_ref(), &config)?;
//! for entry in &report.entries {
//!     println!("{} {}", entry.outcome, entry.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod parser;
pub mod schema;
pub mod validator;

pub use error::SchemaError;
pub use generator::{generate, generate_from_path, GenerationReport};
pub use parser::{parse, ParseResult};
pub use schema::{load_schema, HyperSchema};
