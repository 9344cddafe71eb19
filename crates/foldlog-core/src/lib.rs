//! Log rendering engine for foldlog
//!
//! This crate turns raw CI log text into a render model: lines are cut into text and
//! fold particles, particles are decoded from ANSI escapes into styled segments, and
//! segments are annotated with error matches and links.

mod ansi;
mod cache;
pub mod config;
mod error;
mod error_match;
mod links;
mod pipeline;
mod rules;
mod segmenter;

pub use ansi::{
    decode, decode_with_state, normalize_carriage_returns, strip_escapes, AnsiColor, SgrState,
};
pub use cache::{CacheStats, RenderCache};
pub use config::{ErrorPatternConfig, PipelineConfig, RuleConfig};
pub use error::{ConfigError, LabelReferenceError, MarkerSide, Result};
pub use error_match::{
    compile_error_patterns, match_errors, ErrorPattern, ErrorPresets, ErrorTest, SegmentPredicate,
};
pub use links::extract_links;
pub use pipeline::{render, split_lines, LogInput, Pipeline, PipelineOptions};
pub use rules::{compile_rules, FoldPresets, LabelToken, MatcherRule};
pub use segmenter::{segment, segment_line};

// Re-export types used in our public API
pub use foldlog_types::{
    ColorRef, Decoration, ErrorMatch, LinkKind, LinkPart, Particle, ParticleKind, RenderModel,
    RenderRow, StyledSegment,
};
