//! Configuration loading and parsing

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zero_log_decoder::DecoderConfig;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub join: JoinConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub omit_units: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output_dir: None,
            omit_units: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    #[default]
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

/// Secondary logs merged into the primary log
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JoinConfig {
    #[serde(default)]
    pub secondaries: Vec<SecondaryLogConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecondaryLogConfig {
    pub tag: String,
    pub file: PathBuf,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Parse a `TAG=FILE` command line value
pub fn parse_secondary(value: &str) -> Result<SecondaryLogConfig, String> {
    match value.split_once('=') {
        Some((tag, file)) if !tag.is_empty() && !file.is_empty() => Ok(SecondaryLogConfig {
            tag: tag.to_string(),
            file: PathBuf::from(file),
        }),
        _ => Err(format!("expected TAG=FILE, got {:?}", value)),
    }
}
