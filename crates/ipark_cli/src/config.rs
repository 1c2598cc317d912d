//! iPark configuration file handling

use anyhow::{Context, Result};
use ipark_sheet::SheetConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE: &str = "ipark.toml";

/// Viewport height used when no configuration file exists
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 844.0;

/// Top-level iPark configuration (ipark.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct IparkConfig {
    pub sheet: SheetConfig,
}

impl Default for IparkConfig {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::new(DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}

impl IparkConfig {
    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: IparkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Load `path` if given, otherwise `ipark.toml` in `dir` if present,
    /// otherwise the defaults
    pub fn resolve(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let fallback = dir.join(CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "using config file");
            Self::load(&fallback)
        } else {
            tracing::debug!("no {CONFIG_FILE} found; using defaults");
            Ok(Self::default())
        }
    }

    /// Replace the viewport height, re-checking the result
    pub fn with_viewport_height(mut self, height: f32) -> Result<Self> {
        self.sheet.viewport_height = height;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.sheet
            .validate()
            .context("Invalid [sheet] configuration")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
