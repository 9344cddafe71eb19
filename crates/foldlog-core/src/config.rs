//! Deserializable pipeline configuration.
//!
//! Patterns are plain strings here. [`PipelineConfig::compile`] validates all of them
//! up front, so a configuration that compiles can never fail while rendering.

use serde::Deserialize;

use crate::error::Result;
use crate::error_match::{compile_error_patterns, ErrorPresets};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::rules::{compile_rules, FoldPresets};

/// One fold marker pair
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    pub start: String,

    pub end: String,

    /// Literal label, or `$N` to use capture group N of the start match
    pub label: String,

    /// Label used when a `$N` reference cannot be resolved
    #[serde(default)]
    pub fallback_label: Option<String>,

    #[serde(default)]
    pub fold_by_default: bool,
}

impl RuleConfig {
    pub fn new(start: impl Into<String>, end: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            label: label.into(),
            fallback_label: None,
            fold_by_default: false,
        }
    }

    pub fn folded(mut self) -> Self {
        self.fold_by_default = true;
        self
    }
}

/// One tagged error regex
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorPatternConfig {
    pub tag: String,

    pub pattern: String,

    #[serde(default)]
    pub case_insensitive: bool,
}

impl ErrorPatternConfig {
    pub fn new(tag: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pattern: pattern.into(),
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

/// Full configuration for one pipeline
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Emit class names instead of RGB values for colors
    pub use_symbolic_colors: bool,

    /// Split decoded segments into text and URL parts
    pub linkify: bool,

    /// Fold rules, highest priority first
    pub rules: Vec<RuleConfig>,

    pub error_patterns: Vec<ErrorPatternConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_symbolic_colors: false,
            linkify: true,
            rules: Vec::new(),
            error_patterns: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Configuration made of the built-in presets, for callers with no config at all
    pub fn with_presets() -> Self {
        Self {
            rules: FoldPresets::all(),
            error_patterns: ErrorPresets::common(),
            ..Self::default()
        }
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            use_symbolic_colors: self.use_symbolic_colors,
            linkify: self.linkify,
        }
    }

    /// Validate every pattern and build a pipeline
    pub fn compile(&self) -> Result<Pipeline> {
        let rules = compile_rules(&self.rules)?;
        let error_patterns = compile_error_patterns(&self.error_patterns)?;
        Ok(Pipeline::new(rules, error_patterns).with_options(self.options()))
    }
}
