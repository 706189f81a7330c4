//! Configuration file support for quay.
//!
//! quay supports two configuration file locations:
//! - Global: `~/.quay/config.toml` - User-wide defaults
//! - Project: `.quay/config.toml` next to the recipe - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::settings::PartialSettings;
use crate::sources::FetchStrategy;

/// quay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Source fetching settings
    pub source: SourceConfig,

    /// Default recipe settings
    pub settings: SettingsConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel jobs (None = let Meson decide)
    pub jobs: Option<usize>,

    /// Path to the meson executable
    pub meson: Option<PathBuf>,

    /// Always show build tool output
    pub verbose: bool,
}

/// Source-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Fetch strategy used when the recipe does not pick one
    pub strategy: Option<FetchStrategy>,
}

/// Default settings, as they would be passed with `-s key=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
}

impl SettingsConfig {
    /// Parse the configured defaults.
    pub fn to_partial(&self) -> Result<PartialSettings, RecipeError> {
        let mut partial = PartialSettings::default();
        let fields = [
            ("os", &self.os),
            ("arch", &self.arch),
            ("compiler", &self.compiler),
            ("build_type", &self.build_type),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                partial.set(key, value)?;
            }
        }
        Ok(partial)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.meson.is_some() {
            self.build.meson = other.build.meson;
        }
        if other.build.verbose {
            self.build.verbose = true;
        }

        // Source settings
        if other.source.strategy.is_some() {
            self.source.strategy = other.source.strategy;
        }

        // Default settings
        if other.settings.os.is_some() {
            self.settings.os = other.settings.os;
        }
        if other.settings.arch.is_some() {
            self.settings.arch = other.settings.arch;
        }
        if other.settings.compiler.is_some() {
            self.settings.compiler = other.settings.compiler;
        }
        if other.settings.build_type.is_some() {
            self.settings.build_type = other.settings.build_type;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.quay/config.toml)
/// 2. Global config (~/.quay/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the project config path (`<base>/.quay/config.toml`).
pub fn project_config_path(base: &Path) -> PathBuf {
    base.join(".quay").join("config.toml")
}
