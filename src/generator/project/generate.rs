use anyhow::Context;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use super::materialize::{Materializer, OverwritePolicy, WriteOutcome};
use crate::config::GeneratorConfig;
use crate::generator::artifact::{ArtifactKind, ModuleNames};
use crate::generator::flavor::{Flavor, FlavorRegistry};
use crate::generator::render::RenderContext;
use crate::schema::{load_schema, HyperSchema};
use crate::validator::{JsonSchemaBuilder, ValidatorBuilder};

/// One line of a [`GenerationReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Full path of the artifact
    pub path: PathBuf,
    /// What happened to it
    pub outcome: WriteOutcome,
}

/// Outcome of a generation run, in render order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Package name used for the run
    pub package_name: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Per-artifact outcomes
    pub entries: Vec<ReportEntry>,
}

impl GenerationReport {
    /// Entries with the given outcome
    pub fn with_outcome(&self, outcome: WriteOutcome) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.outcome == outcome)
    }

    /// Number of files written to disk
    pub fn written(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.outcome,
                    WriteOutcome::Written | WriteOutcome::WrittenUnformatted
                )
            })
            .count()
    }

    /// Outcome for one artifact kind
    pub fn outcome(&self, kind: ArtifactKind) -> Option<WriteOutcome> {
        self.entries.iter().find(|e| e.kind == kind).map(|e| e.outcome)
    }
}

/// Generate with the built-in flavors and the `jsonschema` validator builder.
///
/// # Errors
///
/// See [`generate_with`].
pub fn generate(doc: &HyperSchema, config: &GeneratorConfig) -> anyhow::Result<GenerationReport> {
    generate_with(doc, config, &FlavorRegistry::builtin(), &JsonSchemaBuilder)
}

/// Load the schema at `path` and generate.
///
/// # Errors
///
/// Fails if the schema cannot be loaded, then as [`generate_with`].
pub fn generate_from_path(path: &Path, config: &GeneratorConfig) -> anyhow::Result<GenerationReport> {
    let doc = load_schema(path)?;
    generate(&doc, config)
}

/// Run the whole pipeline: parse once, render every artifact of the selected
/// flavors, and write each through the overwrite policy.
///
/// When several flavors are selected their artifact sets are merged; each
/// artifact is rendered by the first selected flavor that lists it.
///
/// # Errors
///
/// Returns the first configuration, schema, render or I/O error. Artifacts
/// written before the failure stay on disk.
pub fn generate_with(
    doc: &HyperSchema,
    config: &GeneratorConfig,
    registry: &FlavorRegistry,
    builder: &dyn ValidatorBuilder,
) -> anyhow::Result<GenerationReport> {
    config.validate()?;
    let flavors = config
        .flavors
        .iter()
        .map(|tag| registry.get(tag))
        .collect::<anyhow::Result<Vec<&dyn Flavor>>>()?;
    let primary = flavors
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("at least one flavor is required"))?;

    let result = primary.parse(doc, builder)?;

    let package_name = config.package_name.clone().unwrap_or_else(|| result.slug.clone());
    let names = ModuleNames {
        crate_ident: package_name.replace('-', "_"),
        validators: config.validator_module.clone(),
        client: config.client_module.clone(),
    };
    let kinds: BTreeSet<ArtifactKind> = flavors
        .iter()
        .flat_map(|f| f.artifacts().iter().copied())
        .collect();
    let ctx = RenderContext {
        result: &result,
        builder,
        package_name: package_name.clone(),
        names,
        kinds,
        max_body_bytes: config.max_body_bytes,
        imports: config.imports_by_kind()?,
        title: doc.title.clone().unwrap_or_else(|| package_name.clone()),
    };

    let materializer = Materializer::new(
        &config.output_dir,
        OverwritePolicy {
            overwrite: config.overwrite,
            force: config.force.clone(),
        },
    )
    .with_format(config.format)
    .with_dry_run(config.dry_run);

    info!(
        package = %package_name,
        output = %config.output_dir.display(),
        flavors = %config.flavors.join(","),
        methods = result.method_names.len(),
        "generating"
    );

    let mut report = GenerationReport {
        package_name,
        output_dir: config.output_dir.clone(),
        entries: Vec::with_capacity(ctx.kinds.len()),
    };
    for &kind in &ctx.kinds {
        let flavor = flavors
            .iter()
            .find(|f| f.artifacts().contains(&kind))
            .copied()
            .unwrap_or(primary);
        let relative = kind.relative_path(&ctx.names);
        let outcome = materializer
            .write_artifact(kind, &relative, || flavor.render(kind, &ctx))
            .with_context(|| format!("Failed to generate {}", relative.display()))?;
        report.entries.push(ReportEntry {
            kind,
            path: materializer.root().join(&relative),
            outcome,
        });
    }
    Ok(report)
}
