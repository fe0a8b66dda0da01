//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the path in `PICKS_CONFIG`) and deserializes
//! into strongly-typed structs. Optional sections fall back to defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::normalizer::{NormalizerConfig, DEFAULT_MIN_YEAR};

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "PICKS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub normalizer: NormalizerSection,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// File path or `http(s)://` URL of the workbook.
    pub location: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sheet_name() -> String {
    "NBA".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct NormalizerSection {
    /// Picks dated before this year are dropped.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
}

fn default_min_year() -> i32 {
    DEFAULT_MIN_YEAR
}

impl Default for NormalizerSection {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Where to write the `{ globalStats, tableData }` JSON, if anywhere.
    pub snapshot_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Config path from `PICKS_CONFIG`, defaulting to `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            min_year: self.normalizer.min_year,
        }
    }
}
