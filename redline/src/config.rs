//! Config file loading.
//!
//! `$XDG_CONFIG_HOME/redline/config.toml` (falling back to
//! `~/.config/redline/config.toml`):
//!
//! ```toml
//! theme = "catppuccin-mocha"
//!
//! [generator]
//! command = ["llm", "--no-stream"]
//! timeout_secs = 120
//!
//! [review]
//! granularity = "word"
//! format_comments = false
//! custom_prompt = "Tighten the prose."
//! ```
//!
//! Config errors are soft failures: they are logged and defaults are used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use redline_core::ReviewConfig;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::Cli;

const DEFAULT_THEME: &str = "catppuccin-mocha";

/// Everything read from the config file, after CLI overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub generator: GeneratorConfig,
    pub review: ReviewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            generator: GeneratorConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments; the prompt is written to its stdin.
    pub command: Vec<String>,
    /// Zero disables the timeout.
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: 120,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Returns the path to the redline config file.
///
/// Prefers `$XDG_CONFIG_HOME/redline/config.toml`; falls back to
/// `~/.config/redline/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("redline").join("config.toml")
}

impl Config {
    /// Loads the config at `path`.
    ///
    /// A missing file yields defaults. An unreadable or malformed file is
    /// logged at `warn` and also yields defaults.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config; using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config parse error; using defaults");
                Self::default()
            }
        }
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(theme) = &cli.theme {
            self.theme = theme.clone();
        }
        if let Some(command) = &cli.command {
            self.generator.command = vec!["sh".to_owned(), "-c".to_owned(), command.clone()];
        }
        if let Some(prompt) = &cli.prompt {
            self.review.custom_prompt = Some(prompt.clone());
        }
        if let Some(grain) = cli.granularity {
            self.review.granularity = grain.into();
        }
    }
}
