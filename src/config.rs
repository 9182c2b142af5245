//! Step configuration file.
//!
//! ```toml
//! target = "${TARGET}"
//! caller = "cleanup"
//! root = "/var/lib/ci/jobs"
//!
//! [vars]
//! TARGET = "nightly-.*"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```
//!
//! Every key is optional; command-line flags take precedence over the file.

use crate::logging::LoggingConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    /// Raw target template.
    pub target: Option<String>,
    /// Full name of the job running the step.
    pub caller: Option<String>,
    /// Registry root directory.
    pub root: Option<PathBuf>,
    /// Extra variable bindings, applied over the process environment.
    pub vars: HashMap<String, String>,
    pub logging: LoggingConfig,
}

impl PruneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("can't read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config")
    }
}
