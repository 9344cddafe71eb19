use regex::{Captures, Regex};

use crate::config::RuleConfig;
use crate::error::{ConfigError, LabelReferenceError, MarkerSide, Result};

/// How a fold label is produced from a start match
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelToken {
    /// Used verbatim
    Literal(String),
    /// `$N`: the Nth capture group of the start match
    Capture(usize),
}

impl LabelToken {
    /// Parse a label as written in configuration. `$` followed by digits is a
    /// group reference, anything else is literal text.
    pub fn parse(label: &str) -> Self {
        match label.strip_prefix('$').map(str::parse::<usize>) {
            Some(Ok(group)) => Self::Capture(group),
            _ => Self::Literal(label.to_string()),
        }
    }
}

/// Compiled fold marker pair. Rules are ranked by their position in a list.
#[derive(Clone, Debug)]
pub struct MatcherRule {
    /// Position in the configured rule list, used in diagnostics
    index: usize,

    start: Regex,

    end: Regex,

    label: LabelToken,

    /// Used when a `$N` label cannot be resolved
    fallback_label: Option<String>,

    fold_by_default: bool,
}

impl MatcherRule {
    /// Compile a rule from its start/end patterns and label token
    pub fn new(start: &str, end: &str, label: &str) -> Result<Self> {
        Self::compile(0, start, end, label)
    }

    /// Compile a rule from configuration, reporting `index` on failure
    pub fn from_config(index: usize, config: &RuleConfig) -> Result<Self> {
        let mut rule = Self::compile(index, &config.start, &config.end, &config.label)?;
        rule.fallback_label = config.fallback_label.clone();
        rule.fold_by_default = config.fold_by_default;
        Ok(rule)
    }

    fn compile(index: usize, start: &str, end: &str, label: &str) -> Result<Self> {
        Ok(Self {
            index,
            start: compile_marker(index, MarkerSide::Start, start)?,
            end: compile_marker(index, MarkerSide::End, end)?,
            label: LabelToken::parse(label),
            fallback_label: None,
            fold_by_default: false,
        })
    }

    /// Start this fold collapsed
    pub fn folded(mut self) -> Self {
        self.fold_by_default = true;
        self
    }

    /// Label to use when a group reference cannot be resolved
    pub fn with_fallback_label(mut self, label: impl Into<String>) -> Self {
        self.fallback_label = Some(label.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> &Regex {
        &self.start
    }

    pub fn end(&self) -> &Regex {
        &self.end
    }

    pub fn label(&self) -> &LabelToken {
        &self.label
    }

    pub fn fold_by_default(&self) -> bool {
        self.fold_by_default
    }

    /// Resolve the label against a start match
    pub fn resolve_label(
        &self,
        captures: &Captures<'_>,
    ) -> std::result::Result<String, LabelReferenceError> {
        match &self.label {
            LabelToken::Literal(text) => Ok(text.clone()),
            LabelToken::Capture(group) => captures
                .get(*group)
                .map(|m| m.as_str().to_string())
                .ok_or(LabelReferenceError {
                    rule: self.index,
                    group: *group,
                }),
        }
    }

    /// Label after applying the recovery policy for unresolved references
    pub fn label_or_fallback(&self, captures: &Captures<'_>) -> String {
        match self.resolve_label(captures) {
            Ok(label) => label,
            Err(err) => {
                tracing::debug!(error = %err, "falling back to literal fold label");
                self.fallback_label.clone().unwrap_or_default()
            }
        }
    }
}

fn compile_marker(index: usize, side: MarkerSide, pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(ConfigError::EmptyRulePattern { index, side });
    }
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRulePattern {
        index,
        side,
        source,
    })
}

/// Compile a ranked rule list, keeping list order as priority
pub fn compile_rules(configs: &[RuleConfig]) -> Result<Vec<MatcherRule>> {
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| MatcherRule::from_config(index, config))
        .collect()
}

/// Ready-made fold rules for common CI log formats
pub struct FoldPresets;

impl FoldPresets {
    /// Travis CI `travis_fold:start:NAME` ... `travis_fold:end:NAME`
    pub fn travis() -> RuleConfig {
        RuleConfig {
            start: r"travis_fold:start:([\w.\-]+)".to_string(),
            end: r"travis_fold:end:[\w.\-]+(?:\r?\x1b\[0K)?".to_string(),
            label: "$1".to_string(),
            fallback_label: Some("travis".to_string()),
            fold_by_default: true,
        }
    }

    /// GitHub Actions `##[group]TITLE` ... `##[endgroup]`
    pub fn github_actions() -> RuleConfig {
        RuleConfig {
            start: r"##\[group\](.*)".to_string(),
            end: r"##\[endgroup\]".to_string(),
            label: "$1".to_string(),
            fallback_label: Some("group".to_string()),
            fold_by_default: true,
        }
    }

    pub fn all() -> Vec<RuleConfig> {
        vec![Self::travis(), Self::github_actions()]
    }
}
