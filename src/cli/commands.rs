use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::generator::{generate, ArtifactKind, FlavorRegistry, WriteOutcome};
use crate::logging::{init_logging, LogFormat};
use crate::parser::ParseResult;
use crate::schema::load_schema;
use crate::validator::JsonSchemaBuilder;

/// Command-line interface for hypergen
#[derive(Parser, Debug)]
#[command(name = "hypergen")]
#[command(about = "Generate Rust HTTP servers, clients and validators from JSON Hyper-Schema", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a crate from a hyper-schema
    Generate {
        /// Path to the hyper-schema (JSON, or YAML by extension)
        #[arg(short, long)]
        schema: PathBuf,

        /// Output directory (default: from config, else `generated`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Package name of the generated crate (default: slug of the schema title)
        #[arg(long)]
        package: Option<String>,

        /// Flavors to render (comma-separated or repeated)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        flavor: Vec<String>,

        /// Replace existing system-owned files
        #[arg(long, default_value_t = false)]
        overwrite: bool,

        /// User-owned kinds to replace as well when --overwrite is given
        #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
        force: Vec<ArtifactKind>,

        /// Write generated code without running rustfmt
        #[arg(long, default_value_t = false)]
        no_format: bool,

        /// Show what would be written without touching the file system
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Configuration file (default: hypergen.toml alongside the schema)
        #[arg(long, env = "HYPERGEN_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the methods, routes and payload types a schema produces
    Inspect {
        /// Path to the hyper-schema
        #[arg(short, long)]
        schema: PathBuf,
    },
    /// List registered flavors and the artifacts each renders
    Flavors,
}

/// Parse the process arguments, set up logging and run the command.
///
/// # Errors
///
/// Returns the command's error.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    init_logging(level, cli.log_format)?;
    run(cli)
}

/// Run a parsed command line.
///
/// # Errors
///
/// Returns configuration, schema and generation errors.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            output,
            package,
            flavor,
            overwrite,
            force,
            no_format,
            dry_run,
            config,
        } => {
            let mut cfg = GeneratorConfig::discover(config.as_deref(), &schema)?;
            if let Some(output) = output {
                cfg.output_dir = output;
            }
            if package.is_some() {
                cfg.package_name = package;
            }
            if !flavor.is_empty() {
                cfg.flavors = flavor;
            }
            cfg.overwrite |= overwrite;
            cfg.force.extend(force);
            if no_format {
                cfg.format = false;
            }
            cfg.dry_run |= dry_run;

            let doc = load_schema(&schema)?;
            let report = generate(&doc, &cfg)
                .with_context(|| format!("Failed to generate from {}", schema.display()))?;
            for entry in &report.entries {
                println!("{:<22} {}", entry.outcome.to_string(), entry.path.display());
            }
            let skipped = report.with_outcome(WriteOutcome::Skipped).count();
            info!(
                package = %report.package_name,
                written = report.written(),
                skipped,
                "generation finished"
            );
            Ok(())
        }
        Commands::Inspect { schema } => {
            let doc = load_schema(&schema)?;
            let registry = FlavorRegistry::builtin();
            let result = registry.get("server")?.parse(&doc, &JsonSchemaBuilder)?;
            print!("{}", inspect_summary(&result));
            Ok(())
        }
        Commands::Flavors => {
            let registry = FlavorRegistry::builtin();
            for tag in registry.tags() {
                let flavor = registry.get(tag)?;
                let kinds: Vec<&str> = flavor.artifacts().iter().map(|k| k.tag()).collect();
                println!("{tag:<10} {}", kinds.join(", "));
            }
            Ok(())
        }
    }
}

/// Human readable summary of a parse result
pub fn inspect_summary(result: &ParseResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("package: {}\nmethods:\n", result.slug));
    for m in result.iter_methods() {
        let request = result
            .request_payload_type
            .get(&m.name)
            .map(String::as_str)
            .unwrap_or("-");
        let response = result
            .response_payload_type
            .get(&m.name)
            .map(String::as_str)
            .unwrap_or("-");
        out.push_str(&format!(
            "  {:<24} {:<7} {:<24} request={} response={}\n",
            m.name,
            m.verb.as_str(),
            m.path,
            request,
            response
        ));
    }
    out.push_str("routes:\n");
    for (path, m) in result.routes() {
        out.push_str(&format!("  {path} -> {}\n", m.name));
    }
    out
}
