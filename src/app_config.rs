use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::pins::PIN_NAME_SEPARATOR;

/// Application configuration module
/// This module handles the slicer configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Pin naming
    #[serde(default)]
    pub pins: PinConfig,

    /// Display surface settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Layer selection settings
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Pin naming configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PinConfig {
    /// Base identifier every pin name starts with
    #[serde(default = "default_base_name")]
    pub base_name: String,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            base_name: default_base_name(),
        }
    }
}

/// Display surface configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Whether the surface starts enabled; mirrored onto the enable pin
    #[serde(default = "default_true")]
    pub initially_enabled: bool,

    /// File the composed layer is written to
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            initially_enabled: true,
            output_path: default_output_path(),
        }
    }
}

/// What to do with a layer index outside `[0, layer_count)`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Accept the index and render a blank layer
    #[default]
    Blank,
    /// Refuse the index and keep the current layer
    Reject,
}

impl std::str::FromStr for RangePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "reject" => Ok(Self::Reject),
            _ => Err(anyhow!("Invalid range policy: {}", s)),
        }
    }
}

/// Layer selection configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SelectionConfig {
    /// Handling of out-of-range layer indices
    #[serde(default)]
    pub out_of_range: RangePolicy,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_base_name() -> String {
    "qtpyvcp.svgslicer".to_string()
}

fn default_output_path() -> String {
    "layer.svg".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let base_name = &self.pins.base_name;
        if base_name.is_empty() {
            return Err(anyhow!("Pin base name must not be empty"));
        }
        if base_name.chars().any(char::is_whitespace) {
            return Err(anyhow!("Pin base name must not contain whitespace: {:?}", base_name));
        }
        if base_name.starts_with(PIN_NAME_SEPARATOR) || base_name.ends_with(PIN_NAME_SEPARATOR) {
            return Err(anyhow!(
                "Pin base name must not start or end with '{}': {:?}",
                PIN_NAME_SEPARATOR, base_name
            ));
        }

        if self.display.output_path.trim().is_empty() {
            return Err(anyhow!("Display output path must not be empty"));
        }

        Ok(())
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_to_file(path, &config_json)
    }

    /// Load the configuration, creating a default file if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = if FileManager::file_exists(path) {
            Self::from_file(path)?
        } else {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save_to_file(path)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
            config
        };

        config.validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            pins: PinConfig::default(),
            display: DisplayConfig::default(),
            selection: SelectionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
