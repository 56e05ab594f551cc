use anyhow::Context;
use std::io::Write;
use std::process::{Command, Stdio};

/// Environment variable that overrides the formatter binary
pub const RUSTFMT_BIN_ENV: &str = "HYPERGEN_RUSTFMT_BIN";

/// Pipe `source` through `rustfmt` and return the formatted text.
///
/// # Errors
///
/// Fails when the formatter cannot be started, exits unsuccessfully (for
/// instance on a syntax error) or prints something that is not UTF-8.
pub fn format_source(source: &str) -> anyhow::Result<String> {
    // Allow tests to override the rustfmt binary path without mutating PATH
    let bin = std::env::var(RUSTFMT_BIN_ENV).unwrap_or_else(|_| "rustfmt".to_string());

    let mut child = Command::new(&bin)
        .args(["--edition", "2021"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start formatter '{bin}'"))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow::anyhow!("formatter stdin is not available"))?;
    let input = source.to_owned();
    // Feed stdin from its own thread so a large file cannot deadlock on a full stdout pipe
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for formatter '{bin}'"))?;
    let written = writer
        .join()
        .map_err(|_| anyhow::anyhow!("formatter input thread panicked"))?;

    if !output.status.success() {
        anyhow::bail!(
            "{bin} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    written.context("Failed to write source to formatter")?;
    String::from_utf8(output.stdout).context("formatter output is not valid UTF-8")
}
