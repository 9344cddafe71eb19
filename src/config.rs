//! Configuration file loading
//!
//! The file is TOML with the shape of [`PipelineConfig`]:
//!
//! ```toml
//! use_symbolic_colors = false
//! linkify = true
//!
//! [[rules]]
//! start = 'travis_fold:start:([\w.-]+)'
//! end = 'travis_fold:end:[\w.-]+'
//! label = "$1"
//! fold_by_default = true
//!
//! [[error_patterns]]
//! tag = "npm"
//! pattern = 'npm ERR!'
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use foldlog_core::PipelineConfig;

/// Parse a configuration from TOML text
pub fn parse(content: &str) -> Result<PipelineConfig> {
    toml::from_str(content).context("invalid configuration")
}

/// Load the configuration file, or the built-in presets when no file is given
pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        tracing::debug!("no configuration file, using presets");
        return Ok(PipelineConfig::with_presets());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("in {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        rules = config.rules.len(),
        error_patterns = config.error_patterns.len(),
        "loaded configuration"
    );
    Ok(config)
}
