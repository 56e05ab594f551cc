use anyhow::Context;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::format::format_source;
use crate::generator::artifact::{ArtifactKind, Ownership};

/// Which existing files may be replaced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverwritePolicy {
    /// Global overwrite flag
    pub overwrite: bool,
    /// User-owned kinds that may be replaced when `overwrite` is set
    pub force: BTreeSet<ArtifactKind>,
}

impl OverwritePolicy {
    /// Whether an artifact of `kind` may be written given whether it exists
    pub fn allows(&self, kind: ArtifactKind, exists: bool) -> bool {
        if !exists {
            return true;
        }
        match kind.ownership() {
            Ownership::System => self.overwrite,
            Ownership::User => self.overwrite && self.force.contains(&kind),
        }
    }
}

/// What happened to one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written (and formatted, when formatting applies)
    Written,
    /// Written as raw text because the formatter failed
    WrittenUnformatted,
    /// Left alone because the file exists and the policy keeps it
    Skipped,
    /// Dry run: would have been written
    WouldWrite,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteOutcome::Written => "written",
            WriteOutcome::WrittenUnformatted => "written (unformatted)",
            WriteOutcome::Skipped => "skipped",
            WriteOutcome::WouldWrite => "would write",
        };
        f.write_str(s)
    }
}

/// Writes rendered artifacts under an output directory
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
    policy: OverwritePolicy,
    format: bool,
    dry_run: bool,
}

impl Materializer {
    /// Materializer rooted at `root`
    pub fn new(root: impl Into<PathBuf>, policy: OverwritePolicy) -> Self {
        Materializer {
            root: root.into(),
            policy,
            format: true,
            dry_run: false,
        }
    }

    /// Enable or disable the source formatter
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    /// Render but never touch the file system
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render and write one artifact.
    ///
    /// The existing file is checked against the policy before `render` runs.
    /// Output goes to a temporary file in the target directory that is
    /// persisted over the target, so neither a render failure nor a failed
    /// write leaves partial output behind.
    ///
    /// # Errors
    ///
    /// Returns render errors and I/O errors. Formatter failures are not
    /// errors: the raw text is written and the outcome says so.
    pub fn write_artifact<F>(
        &self,
        kind: ArtifactKind,
        relative: &Path,
        render: F,
    ) -> anyhow::Result<WriteOutcome>
    where
        F: FnOnce() -> anyhow::Result<String>,
    {
        let target = self.root.join(relative);
        let exists = target.exists();
        if !self.policy.allows(kind, exists) {
            info!(kind = %kind, path = %target.display(), "skipping existing file");
            return Ok(WriteOutcome::Skipped);
        }

        let text = render().with_context(|| format!("Failed to render {kind} ({})", relative.display()))?;

        let (text, outcome) = if self.format && kind.is_rust() {
            match format_source(&text) {
                Ok(formatted) => (formatted, WriteOutcome::Written),
                Err(e) => {
                    warn!(
                        kind = %kind,
                        path = %target.display(),
                        error = %e,
                        "formatting failed, writing unformatted source"
                    );
                    (text, WriteOutcome::WrittenUnformatted)
                }
            }
        } else {
            (text, WriteOutcome::Written)
        };

        if self.dry_run {
            debug!(kind = %kind, path = %target.display(), bytes = text.len(), "dry run");
            return Ok(WriteOutcome::WouldWrite);
        }

        write_file(&target, text.as_bytes())?;
        info!(kind = %kind, path = %target.display(), outcome = %outcome, "generated");
        Ok(outcome)
    }
}

/// Atomically write `contents` to `path`, creating parent directories.
///
/// Existing files keep their permissions; new files get `0o644` on unix.
///
/// # Errors
///
/// Returns any I/O error with the path attached.
pub fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {:?}", parent))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
    tmp.write_all(contents)
        .with_context(|| format!("Failed to write {:?}", path))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync {:?}", path))?;

    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        std::fs::set_permissions(tmp.path(), permissions)
            .with_context(|| format!("Failed to set permissions on {:?}", path))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to persist {:?}", path))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<std::fs::Permissions> {
    None
}
