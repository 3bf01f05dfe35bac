//! Configuration for the scc-core tool
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration; command line flags override what is
//! loaded here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Profile loaded when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PathBuf>,

    /// Prefer `deck_btn_overrides` / `deck_override_*` bindings
    #[serde(default)]
    pub apply_overrides: bool,

    /// Swap left and right grip lookups
    #[serde(default)]
    pub fixed_grip_indexing: bool,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: None,
            apply_overrides: false,
            fixed_grip_indexing: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        // serde_yaml reads an empty document as null rather than an empty map
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log_level '{}' (expected one of: {})",
                self.log_level,
                LEVELS.join(", ")
            );
        }

        if let Some(profile) = &self.profile {
            if profile.as_os_str().is_empty() {
                anyhow::bail!("profile path cannot be empty");
            }
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
