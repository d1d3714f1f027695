//! Tracing subscriber setup for the CLI and the terminal UI.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

fn env_filter(directive: Option<&str>) -> Result<EnvFilter> {
    let directive: Directive = directive
        .unwrap_or("info")
        .parse()
        .context("invalid --log directive")?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}

/// Log to stderr; used by the one-shot CLI commands.
pub fn init_stderr(directive: Option<&str>) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
    Ok(())
}

/// Log to a file; the terminal UI owns stdout and stderr while it runs.
pub fn init_file(path: &Path, directive: Option<&str>) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file at {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive)?)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .try_init();
    Ok(())
}
