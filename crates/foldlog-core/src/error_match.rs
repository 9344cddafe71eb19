use regex::Regex;
use std::sync::Arc;

use foldlog_types::StyledSegment;

use crate::config::ErrorPatternConfig;
use crate::error::{ConfigError, Result};

/// Predicate signature for custom error tests
pub type SegmentPredicate = dyn Fn(&StyledSegment) -> bool + Send + Sync;

/// How an error pattern decides whether a segment is error output
#[derive(Clone)]
pub enum ErrorTest {
    /// Regex searched in the segment text
    Regex(Regex),
    /// Arbitrary predicate over the whole segment
    Predicate(Arc<SegmentPredicate>),
}

/// A tagged predicate flagging segments that represent error output
#[derive(Clone)]
pub struct ErrorPattern {
    tag: String,

    test: ErrorTest,

    /// Source pattern string (empty for predicates)
    pattern: String,
}

impl ErrorPattern {
    /// Create a pattern from a regex string
    pub fn regex(tag: impl Into<String>, pattern: &str) -> Result<Self> {
        let tag = tag.into();
        let regex = compile(&tag, pattern)?;
        Ok(Self {
            tag,
            test: ErrorTest::Regex(regex),
            pattern: pattern.to_string(),
        })
    }

    /// Create a case-insensitive pattern from a regex string
    pub fn regex_case_insensitive(tag: impl Into<String>, pattern: &str) -> Result<Self> {
        let tag = tag.into();
        if pattern.is_empty() {
            return Err(ConfigError::EmptyErrorPattern { tag });
        }
        // Prepend (?i) for case insensitive matching
        let regex = compile(&tag, &format!("(?i){}", pattern))?;
        Ok(Self {
            tag,
            test: ErrorTest::Regex(regex),
            pattern: pattern.to_string(),
        })
    }

    /// Create a pattern from an arbitrary predicate
    pub fn predicate<F>(tag: impl Into<String>, test: F) -> Self
    where
        F: Fn(&StyledSegment) -> bool + Send + Sync + 'static,
    {
        Self {
            tag: tag.into(),
            test: ErrorTest::Predicate(Arc::new(test)),
            pattern: String::new(),
        }
    }

    pub fn from_config(config: &ErrorPatternConfig) -> Result<Self> {
        if config.case_insensitive {
            Self::regex_case_insensitive(config.tag.clone(), &config.pattern)
        } else {
            Self::regex(config.tag.clone(), &config.pattern)
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if a segment is flagged by this pattern
    pub fn is_match(&self, segment: &StyledSegment) -> bool {
        match &self.test {
            ErrorTest::Regex(re) => re.is_match(&segment.text),
            ErrorTest::Predicate(test) => test(segment),
        }
    }
}

impl std::fmt::Debug for ErrorPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.test {
            ErrorTest::Regex(_) => "regex",
            ErrorTest::Predicate(_) => "predicate",
        };
        f.debug_struct("ErrorPattern")
            .field("tag", &self.tag)
            .field("kind", &kind)
            .field("pattern", &self.pattern)
            .finish()
    }
}

fn compile(tag: &str, pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(ConfigError::EmptyErrorPattern {
            tag: tag.to_string(),
        });
    }
    Regex::new(pattern).map_err(|source| ConfigError::InvalidErrorPattern {
        tag: tag.to_string(),
        source,
    })
}

/// Every pattern that holds for the segment, in configured order
pub fn match_errors<'p>(
    segment: &StyledSegment,
    patterns: &'p [ErrorPattern],
) -> Vec<&'p ErrorPattern> {
    patterns.iter().filter(|p| p.is_match(segment)).collect()
}

/// Compile a list of error pattern configurations, keeping order
pub fn compile_error_patterns(configs: &[ErrorPatternConfig]) -> Result<Vec<ErrorPattern>> {
    configs.iter().map(ErrorPattern::from_config).collect()
}

/// Quick error pattern presets
pub struct ErrorPresets;

impl ErrorPresets {
    /// Patterns that catch the usual failure lines in CI output
    pub fn common() -> Vec<ErrorPatternConfig> {
        vec![
            ErrorPatternConfig::new("error", r"\berror\b").case_insensitive(),
            ErrorPatternConfig::new("npm", r"npm ERR!"),
            ErrorPatternConfig::new("failed", r"\bFAILED\b"),
            ErrorPatternConfig::new("fatal", r"^fatal:"),
            ErrorPatternConfig::new("panic", r"panicked at"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldlog_types::ColorRef;

    #[test]
    fn test_regex_pattern() {
        let pattern = ErrorPattern::regex("err", "error").unwrap();
        assert!(pattern.is_match(&StyledSegment::plain("an error occurred")));
        assert!(!pattern.is_match(&StyledSegment::plain("everything is fine")));
        assert_eq!(pattern.tag(), "err");
        assert_eq!(pattern.pattern(), "error");
    }

    #[test]
    fn test_case_insensitive_pattern() {
        let pattern = ErrorPattern::regex_case_insensitive("err", "error").unwrap();
        assert!(pattern.is_match(&StyledSegment::plain("ERROR: boom")));
    }

    #[test]
    fn test_all_matching_patterns_are_returned() {
        let patterns = vec![
            ErrorPattern::regex("p1", "fail").unwrap(),
            ErrorPattern::regex("p2", "test").unwrap(),
            ErrorPattern::regex("p3", "unrelated").unwrap(),
        ];
        let segment = StyledSegment::plain("test failed");

        let tags: Vec<_> = match_errors(&segment, &patterns)
            .iter()
            .map(|p| p.tag())
            .collect();
        assert_eq!(tags, vec!["p1", "p2"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let patterns = vec![ErrorPattern::regex("p1", "fail").unwrap()];
        assert!(match_errors(&StyledSegment::plain("ok"), &patterns).is_empty());
        assert!(match_errors(&StyledSegment::plain("fail"), &[]).is_empty());
    }

    #[test]
    fn test_predicate_pattern_sees_style() {
        let red = ErrorPattern::predicate("red", |s: &StyledSegment| {
            s.foreground == Some(ColorRef::Rgb(187, 0, 0))
        });
        let mut segment = StyledSegment::plain("x");
        assert!(!red.is_match(&segment));
        segment.foreground = Some(ColorRef::Rgb(187, 0, 0));
        assert!(red.is_match(&segment));
    }

    #[test]
    fn test_invalid_and_empty_patterns() {
        assert!(matches!(
            ErrorPattern::regex("bad", "(").unwrap_err(),
            ConfigError::InvalidErrorPattern { .. }
        ));
        assert!(matches!(
            ErrorPattern::regex("empty", "").unwrap_err(),
            ConfigError::EmptyErrorPattern { .. }
        ));
        assert!(matches!(
            ErrorPattern::regex_case_insensitive("empty", "").unwrap_err(),
            ConfigError::EmptyErrorPattern { .. }
        ));
    }

    #[test]
    fn test_presets() {
        let patterns = compile_error_patterns(&ErrorPresets::common()).unwrap();
        let hits = |text: &str| -> Vec<String> {
            match_errors(&StyledSegment::plain(text), &patterns)
                .iter()
                .map(|p| p.tag().to_string())
                .collect()
        };

        assert_eq!(hits("npm ERR! code 1"), vec!["npm"]);
        assert_eq!(hits("Error: cannot find module"), vec!["error"]);
        assert_eq!(hits("fatal: not a git repository"), vec!["fatal"]);
        assert_eq!(hits("test result: FAILED. 1 passed"), vec!["failed"]);
        assert!(hits("no errors here, terrorism aside").is_empty());
    }
}
