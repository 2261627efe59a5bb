//! Console logging for the command-line tool

use anyhow::Context;
use isobridge_core::{GeneratorConfig, LogLevel};
use tracing_subscriber::EnvFilter;

/// Where the effective log filter came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    /// `--log-level`
    Flag(LogLevel),
    /// `RUST_LOG`, taken as a full filter directive
    Environment(String),
    /// `[logging] level` of the configuration file, or its default
    Config(LogLevel),
}

impl FilterSource {
    fn filter(&self) -> EnvFilter {
        match self {
            FilterSource::Flag(level) | FilterSource::Config(level) => {
                EnvFilter::new(level.as_directive())
            }
            FilterSource::Environment(directive) => EnvFilter::new(directive),
        }
    }
}

/// Pick the log filter: the flag wins over `RUST_LOG`, which wins over the
/// configuration file
pub fn resolve_filter(
    flag: Option<&str>,
    env: Option<String>,
    config: &GeneratorConfig,
) -> anyhow::Result<FilterSource> {
    if let Some(flag) = flag {
        let level = LogLevel::parse(flag).context("Invalid --log-level")?;
        return Ok(FilterSource::Flag(level));
    }
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        return Ok(FilterSource::Environment(directive));
    }
    let level = config
        .log_level()
        .context("Invalid [logging] level in configuration")?;
    Ok(FilterSource::Config(level))
}

/// Install the global subscriber writing to stderr
///
/// Later calls are ignored.
pub fn init(source: &FilterSource) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(source.filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
#[path = "logging/logging_tests.rs"]
mod logging_tests;
