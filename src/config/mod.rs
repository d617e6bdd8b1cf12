//! Configuration handling for gitfacts.
//!
//! This module provides configuration loading and validation,
//! supporting both `gitfacts.toml` files and sensible defaults.

use crate::core::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "gitfacts.toml";

/// Pattern every fact key must match.
const FACT_KEY_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How git is invoked.
    pub git: GitConfig,
    /// How facts are rendered.
    pub facts: FactsConfig,
}

impl Config {
    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file(start: &Path) -> Result<PathBuf> {
        let mut current = start;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAME),
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let key_pattern = Regex::new(FACT_KEY_PATTERN).map_err(|e| Error::Internal {
            message: format!("Invalid fact key pattern: {e}"),
        })?;

        for (field, key) in [
            ("facts.url_key", &self.facts.url_key),
            ("facts.branch_key", &self.facts.branch_key),
        ] {
            if !key_pattern.is_match(key) {
                return Err(Error::config_invalid(
                    field,
                    format!("Invalid fact key '{key}', expected {FACT_KEY_PATTERN}"),
                ));
            }
        }

        if self.facts.url_key == self.facts.branch_key {
            return Err(Error::config_invalid(
                "facts.branch_key",
                format!("Duplicates facts.url_key '{}'", self.facts.url_key),
            ));
        }

        for (field, value) in [("git.remote", &self.git.remote), ("git.binary", &self.git.binary)] {
            if value.is_empty() {
                return Err(Error::config_invalid(field, "Must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(Error::config_invalid(
                    field,
                    format!("Must not contain whitespace: '{value}'"),
                ));
            }
        }

        Ok(())
    }

    /// Generates default configuration as a string.
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml()
    }

    /// Serializes this configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Internal {
            message: format!("Failed to serialize config: {e}"),
        })
    }
}

/// Git invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Git binary name or path, resolved on `PATH`.
    pub binary: String,
    /// Remote whose push URL is reported.
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            remote: "origin".to_string(),
        }
    }
}

/// Fact rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactsConfig {
    /// Key of the push URL fact.
    pub url_key: String,
    /// Key of the current branch fact.
    pub branch_key: String,
    /// When to append `.git` to the push URL.
    pub url_suffix: SuffixPolicy,
    /// What to emit when a lookup fails.
    pub on_failure: FailurePolicy,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            url_key: "giturl".to_string(),
            branch_key: "gitbranch".to_string(),
            url_suffix: SuffixPolicy::default(),
            on_failure: FailurePolicy::default(),
            format: OutputFormat::default(),
        }
    }
}

/// When the `.git` suffix is appended to a push URL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SuffixPolicy {
    /// Always append, even if the URL already ends in `.git`.
    #[default]
    Always,
    /// Append only when the URL does not already end in `.git`.
    IfMissing,
    /// Never append.
    Never,
}

impl SuffixPolicy {
    /// Applies the policy to a URL.
    #[must_use]
    pub fn apply(self, url: &str) -> String {
        match self {
            Self::Always => format!("{url}.git"),
            Self::IfMissing if !url.ends_with(".git") => format!("{url}.git"),
            Self::IfMissing | Self::Never => url.to_string(),
        }
    }
}

/// What a fact holds when its lookup failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Emit an empty value.
    #[default]
    Empty,
    /// Emit whatever git printed.
    Passthrough,
}

/// How facts are written to stdout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One `key=value` line per fact.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}
