use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::coordinator::WorkerLimit;
use crate::patterns::DEFAULT_EDGE_PATTERN;
use crate::source::DEFAULT_MAX_LINE_LENGTH;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

fn default_prefix() -> String {
    "pihole.log".to_string()
}

fn default_output() -> String {
    "youtube_domains.txt".to_string()
}

fn default_confirm() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "PIHOLE_LOGS_DIR")]
    pub logs_directory: PathBuf,

    #[serde(rename = "LOG_FILE_NAME_PREFIX", default = "default_prefix")]
    pub log_file_prefix: String,

    #[serde(rename = "COMPILED_FILE_NAME", default = "default_output")]
    pub output_file: String,

    #[serde(rename = "POP_CONFIRMATION_DIALOGUE", default = "default_confirm")]
    pub confirm: bool,

    #[serde(rename = "EDGE_PATTERN", default, skip_serializing_if = "Option::is_none")]
    pub edge_pattern: Option<String>,

    #[serde(rename = "MAX_LINE_LENGTH", default, skip_serializing_if = "Option::is_none")]
    pub max_line_length: Option<usize>,

    #[serde(rename = "WORKERS", default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logs_directory: PathBuf::from("/var/log/pihole/"),
            log_file_prefix: default_prefix(),
            output_file: default_output(),
            confirm: default_confirm(),
            edge_pattern: None,
            max_line_length: None,
            workers: None,
        }
    }
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content).context("Could not decode config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!(action = "load", component = "config", file_path = ?path, "Loading configuration");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_file_prefix.is_empty() {
            anyhow::bail!("LOG_FILE_NAME_PREFIX must not be empty");
        }
        if self.output_file.trim().is_empty() {
            anyhow::bail!("COMPILED_FILE_NAME must not be empty");
        }
        if self.max_line_length == Some(0) {
            anyhow::bail!("MAX_LINE_LENGTH must be greater than 0");
        }
        self.worker_limit()?;
        Ok(())
    }

    pub fn edge_pattern(&self) -> &str {
        self.edge_pattern.as_deref().unwrap_or(DEFAULT_EDGE_PATTERN)
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length.unwrap_or(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn worker_limit(&self) -> Result<WorkerLimit> {
        match &self.workers {
            Some(raw) => raw.parse::<WorkerLimit>().map_err(anyhow::Error::msg),
            None => Ok(WorkerLimit::default()),
        }
    }
}

/// Writes a config file with the default settings, refusing to overwrite one.
pub fn init_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            path.display()
        );
    }

    let content = serde_json::to_string_pretty(&Config::default())
        .context("Failed to encode default config")?;
    fs::write(path, content + "\n")
        .with_context(|| format!("Could not write config file {:?}", path))?;
    println!("Created {} with default settings", path.display());

    Ok(())
}
