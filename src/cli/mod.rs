//! # CLI Module
//!
//! Thin command-line layer over the generator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! ```bash
//! hypergen generate --schema schema.json --output my-service
//! ```
//!
//! Options:
//! - `--schema <FILE>` - hyper-schema, JSON or YAML (required)
//! - `--output <DIR>` - output directory
//! - `--package <NAME>` - package name (default: slug of the schema title)
//! - `--flavor <TAGS>` - `server`, `client`, `validator` (comma-separated)
//! - `--overwrite` - replace system-owned files
//! - `--force <KINDS>` - with `--overwrite`, also replace these user-owned kinds
//! - `--no-format` - skip rustfmt
//! - `--dry-run` - report without writing
//! - `--config <FILE>` - configuration file (default: `hypergen.toml` next to the schema)
//!
//! ### `inspect`
//!
//! ```bash
//! hypergen inspect --schema schema.json
//! ```
//!
//! Prints method names, verbs, paths and payload types.
//!
//! ### `flavors`
//!
//! Lists the registered flavors with the artifacts each one renders.

mod commands;


pub use commands::{inspect_summary, run, run_cli, Cli, Commands};
