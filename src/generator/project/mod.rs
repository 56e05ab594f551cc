mod format;
mod generate;
mod materialize;

pub use format::{format_source, RUSTFMT_BIN_ENV};
pub use generate::{
    generate, generate_from_path, generate_with, GenerationReport, ReportEntry,
};
pub use materialize::{write_file, Materializer, OverwritePolicy, WriteOutcome};
