//! Error types for pipeline construction and label resolution.
//!
//! Only [`ConfigError`] ever leaves the crate. [`LabelReferenceError`] is produced
//! while segmenting and recovered on the spot, so a bad label can never drop log
//! content.

use thiserror::Error;

/// Which half of a marker pair a pattern belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerSide {
    Start,
    End,
}

impl std::fmt::Display for MarkerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Construction-time failure. Prevents a pipeline from being built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A fold rule pattern failed to compile
    #[error("fold rule #{index}: invalid {side} pattern: {source}")]
    InvalidRulePattern {
        index: usize,
        side: MarkerSide,
        #[source]
        source: regex::Error,
    },

    /// A fold rule pattern was empty
    #[error("fold rule #{index}: {side} pattern is empty")]
    EmptyRulePattern { index: usize, side: MarkerSide },

    /// An error pattern failed to compile
    #[error("error pattern '{tag}': invalid pattern: {source}")]
    InvalidErrorPattern {
        tag: String,
        #[source]
        source: regex::Error,
    },

    /// An error pattern was empty
    #[error("error pattern '{tag}': pattern is empty")]
    EmptyErrorPattern { tag: String },
}

/// A `$N` label referenced a capture group the start match does not have.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fold rule #{rule}: label references capture group ${group}, which is not present in the start match")]
pub struct LabelReferenceError {
    pub rule: usize,
    pub group: usize,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConfigError::EmptyRulePattern {
            index: 2,
            side: MarkerSide::End,
        };
        assert_eq!(err.to_string(), "fold rule #2: end pattern is empty");

        let err = LabelReferenceError { rule: 0, group: 3 };
        assert!(err.to_string().contains("$3"));
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidErrorPattern {
            tag: "npm".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("error pattern 'npm': invalid pattern"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
