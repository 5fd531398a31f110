//! Tracing setup.
//!
//! The terminal belongs to the TUI, so log output goes to a file under the
//! XDG state directory. The filter comes from `REDLINE_LOG`, defaulting to
//! `info` (`debug` with `--verbose`).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Returns the log file path.
///
/// Prefers `$XDG_STATE_HOME/redline/redline.log`; falls back to
/// `~/.local/state/redline/redline.log`.
pub fn log_path() -> PathBuf {
    let base = std::env::var("XDG_STATE_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from(".local/state"));
    base.join("redline").join("redline.log")
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env("REDLINE_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("redline=debug,redline_core=debug,info")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Installs the global subscriber writing to [`log_path`].
///
/// # Errors
///
/// Returns `Err` if the log directory or file cannot be created, or a
/// subscriber is already installed.
pub fn init(verbose: bool) -> anyhow::Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(path = %path.display(), "tracing initialized");
    Ok(path)
}
