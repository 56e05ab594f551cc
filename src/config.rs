//! Generator configuration
//!
//! Settings come from a TOML file that sits alongside the schema
//! (`hypergen.toml`) or is named with `--config`; command-line flags then
//! override individual values.
//!
//! ```toml
//! package_name = "pet_store"
//! output_dir = "generated/pet_store"
//! overwrite = true
//! force = ["handlers"]
//! flavors = ["server"]
//! max_body_bytes = 1048576
//!
//! [imports]
//! server = ["crate::middleware::{auth, log}"]
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::generator::naming::{is_use_tree, sanitize_field_name};
use crate::generator::ArtifactKind;

/// File name looked up next to the schema
pub const CONFIG_FILE_NAME: &str = "hypergen.toml";

/// Default JSON body limit of generated servers (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Package name of the generated crate; the schema title slug when unset
    pub package_name: Option<String>,
    /// Directory the generated crate is written to
    pub output_dir: PathBuf,
    /// Replace existing system-owned files (and forced user-owned ones)
    pub overwrite: bool,
    /// User-owned artifact kinds replaced when `overwrite` is set
    pub force: BTreeSet<ArtifactKind>,
    /// Flavor tags to render
    pub flavors: Vec<String>,
    /// Run generated Rust through `rustfmt`
    pub format: bool,
    /// Render without writing
    pub dry_run: bool,
    /// JSON body limit of the generated server
    pub max_body_bytes: usize,
    /// Module name of the validator registration
    pub validator_module: String,
    /// Module name of the client
    pub client_module: String,
    /// Extra `use` trees keyed by artifact kind tag
    pub imports: BTreeMap<String, Vec<String>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            package_name: None,
            output_dir: PathBuf::from("generated"),
            overwrite: false,
            force: BTreeSet::new(),
            flavors: vec!["server".to_string()],
            format: true,
            dry_run: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            validator_module: "validators".to_string(),
            client_module: "client".to_string(),
            imports: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML or names unknown keys.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config: {}", path.display()))?;
        let config: GeneratorConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse generator config: {}", path.display()))?;
        Ok(config)
    }

    /// Resolve and load the configuration for `schema_path`
    ///
    /// Priority:
    /// 1. Explicitly provided path (must exist)
    /// 2. `hypergen.toml` alongside the schema
    /// 3. Defaults
    ///
    /// # Errors
    ///
    /// Fails if an explicit path is missing or a found file does not parse.
    pub fn discover(explicit: Option<&Path>, schema_path: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match auto_detect_config_path(schema_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Check that names and imports can be emitted as Rust.
    ///
    /// # Errors
    ///
    /// Describes the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, module) in [
            ("validator_module", &self.validator_module),
            ("client_module", &self.client_module),
        ] {
            if sanitize_field_name(module) != *module {
                anyhow::bail!("{key} '{module}' is not a valid module name");
            }
        }
        if self.validator_module == self.client_module {
            anyhow::bail!("validator_module and client_module must differ");
        }
        if let Some(name) = &self.package_name {
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && !name.starts_with(|c: char| c.is_ascii_digit());
            if !valid {
                anyhow::bail!("package_name '{name}' is not a valid package name");
            }
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than zero");
        }
        if self.flavors.is_empty() {
            anyhow::bail!("at least one flavor is required");
        }
        self.imports_by_kind()?;
        Ok(())
    }

    /// The `[imports]` table keyed by artifact kind.
    ///
    /// # Errors
    ///
    /// Fails on unknown kind tags and on values that are not `use` trees.
    pub fn imports_by_kind(&self) -> anyhow::Result<BTreeMap<ArtifactKind, Vec<String>>> {
        let mut out = BTreeMap::new();
        for (tag, paths) in &self.imports {
            let kind = ArtifactKind::from_tag(tag)
                .ok_or_else(|| anyhow::anyhow!("imports: unknown artifact kind '{tag}'"))?;
            if let Some(bad) = paths.iter().find(|p| !is_use_tree(p)) {
                anyhow::bail!("imports.{tag}: '{bad}' is not a valid use path");
            }
            out.insert(kind, paths.clone());
        }
        Ok(out)
    }
}

/// Path of `hypergen.toml` next to the schema, if the file exists
pub fn auto_detect_config_path(schema_path: &Path) -> Option<PathBuf> {
    let config_path = schema_path.parent()?.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}
