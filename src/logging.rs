//! Diagnostic logging.
//!
//! Step output (the `Deletion target : ...` lines) goes to the step's own log sink.
//! This module only sets up `tracing` for the structured diagnostics around it,
//! written to stderr so they never mix with step output.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive; overrides the config level.
pub const LOG_ENV_VAR: &str = "JOB_PRUNER_LOG";

/// Output format of diagnostic logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `[logging]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error, off, or per-module rules.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

fn build_env_filter(override_directive: Option<&str>, config: &LoggingConfig) -> Result<EnvFilter> {
    match override_directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid {} value '{}'", LOG_ENV_VAR, directive)),
        None => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level '{}'", config.level)),
    }
}

/// Install the global `tracing` subscriber.
///
/// Priority: `JOB_PRUNER_LOG`, then `config.level`. A malformed value in either is an
/// error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let directive = match std::env::var(LOG_ENV_VAR) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(e) => return Err(e).with_context(|| format!("cannot read {}", LOG_ENV_VAR)),
    };
    let filter = build_env_filter(directive.as_deref(), config)?;
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .context("failed to install log subscriber")
}
