//! Generator configuration loaded from `isobridge.toml`

use crate::LogLevel;
use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration file
///
/// Every section and key is optional; command-line flags override the values
/// read here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub generator: GeneratorSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[generator]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Directory receiving generated sources and resources
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Whether provider listings for process services are written
    #[serde(default = "default_registrations")]
    pub registrations: bool,

    /// Comment placed at the top of every generated source
    #[serde(default)]
    pub header: Option<String>,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_output() -> PathBuf {
    PathBuf::from("generated")
}

fn default_registrations() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            output: default_output(),
            registrations: default_registrations(),
            header: None,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from TOML text; empty input yields the defaults
    pub fn from_toml(text: &str) -> CoreResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// The configured log level
    pub fn log_level(&self) -> CoreResult<LogLevel> {
        LogLevel::parse(&self.logging.level)
    }
}
