//! Configuration management for the CLI

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Region used when neither `--region` nor `AWS_REGION` is given
    pub default_region: Option<String>,
    /// Named credentials profile
    pub default_profile: Option<String>,
    /// Default output format (`table` or `json`)
    pub default_format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration from `~/.config/asctl/config.json`, if present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("asctl").join("config.json"))
    }
}

/// Settings after merging flags, environment and the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub region: String,
    pub profile: Option<String>,
    pub format: OutputFormat,
}

impl Config {
    pub fn output_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.default_format).unwrap_or_default()
    }

    /// Flags (and their env fallbacks) win over the file
    pub fn resolve(
        self,
        region: Option<String>,
        profile: Option<String>,
        format: Option<OutputFormat>,
    ) -> Result<Resolved> {
        let format = self.output_format(format);
        let region = region
            .or(self.default_region)
            .context("No region configured; pass --region or set AWS_REGION")?;

        Ok(Resolved {
            region,
            profile: profile.or(self.default_profile),
            format,
        })
    }
}
