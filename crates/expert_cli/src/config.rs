//! Configuration for the `expert-system` binary.
//!
//! Settings are layered: defaults, then environment overrides
//! ([`Config::from_env`]), then command-line flags applied by `main`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ENV_NO_COLOR, ENV_OUTPUT, ENV_REASONING};

/// How query results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable, optionally colored.
    #[default]
    Text,
    /// A single JSON document on stdout.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::UnknownOutput(other.to_string())),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The rule file to load.
    pub file: PathBuf,
    /// Start the what-if prompt instead of answering once.
    pub interactive: bool,
    /// Print an explanation for every query.
    pub reasoning: bool,
    pub output: OutputFormat,
    /// Use ANSI colors in text output.
    pub color: bool,
    /// Number of `-v` flags.
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            interactive: false,
            reasoning: false,
            output: OutputFormat::Text,
            color: true,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Creates a configuration from the default values and environment overrides.
    ///
    /// - `EXPERT_SYSTEM_REASONING=1` (or `true`) enables explanations
    /// - `EXPERT_SYSTEM_OUTPUT=json|text` selects the output format
    /// - `NO_COLOR` set to anything disables colors
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_REASONING) {
            config.reasoning = matches!(value.trim(), "1" | "true" | "yes");
        }

        if let Some(value) = lookup(ENV_OUTPUT) {
            match value.parse() {
                Ok(format) => config.output = format,
                Err(e) => log::warn!("Ignoring {}: {}", ENV_OUTPUT, e),
            }
        }

        if lookup(ENV_NO_COLOR).is_some() {
            config.color = false;
        }

        config
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file.as_os_str().is_empty() {
            return Err(ConfigError::MissingFile);
        }
        if self.interactive && self.output == OutputFormat::Json {
            return Err(ConfigError::InteractiveJson);
        }
        Ok(())
    }

    /// The `env_logger` filter implied by the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Errors that can occur while validating a [`Config`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no rule file given")]
    MissingFile,
    #[error("unknown output format '{0}' (expected 'text' or 'json')")]
    UnknownOutput(String),
    #[error("interactive mode does not support JSON output")]
    InteractiveJson,
}
