//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.phaseplot.toml` files.

use crate::models::Channel;
use crate::phase::DEFAULT_STEP_SECONDS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".phaseplot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input discovery settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Relative phase settings.
    #[serde(default)]
    pub phase: PhaseConfig,

    /// Chart settings.
    #[serde(default)]
    pub plot: PlotConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// File extensions picked up when walking directories.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory or file names skipped when walking directories.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Maximum number of files to load.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: Vec::new(),
            max_files: default_max_files(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_max_files() -> usize {
    1000
}

/// Relative phase settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Channel carrying the modulo-256 phase counter.
    #[serde(default)]
    pub channel: Channel,

    /// Spacing of the common resampling grid in seconds.
    #[serde(default = "default_step")]
    pub step_seconds: f64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            channel: Channel::default(),
            step_seconds: default_step(),
        }
    }
}

fn default_step() -> f64 {
    DEFAULT_STEP_SECONDS
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> u32 {
    900
}

fn default_height() -> u32 {
    600
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(channel) = args.channel {
            self.phase.channel = channel;
        }
        if let Some(step) = args.step {
            self.phase.step_seconds = step;
        }
        if let Some(width) = args.width {
            self.plot.width = width;
        }
        if let Some(height) = args.height {
            self.plot.height = height;
        }
        if let Some(max_files) = args.max_files {
            self.loader.max_files = max_files;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
