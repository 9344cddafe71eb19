//! Composition of segmentation, decoding, link extraction and error matching.

use std::borrow::Cow;
use std::sync::Arc;

use foldlog_types::{ErrorMatch, LinkPart, Particle, RenderModel, RenderRow, StyledSegment};

use crate::ansi::decode;
use crate::error_match::{match_errors, ErrorPattern};
use crate::links::extract_links;
use crate::rules::MatcherRule;
use crate::segmenter::segment_line_into;

/// Rendering switches that do not affect segmentation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Emit class names instead of RGB values for colors
    pub use_symbolic_colors: bool,

    /// Split segments into text and URL parts
    pub linkify: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            use_symbolic_colors: false,
            linkify: true,
        }
    }
}

/// A log as handed to the pipeline: one string, or lines already split
#[derive(Clone, Debug)]
pub enum LogInput<'a> {
    Text(Cow<'a, str>),
    Lines(Cow<'a, [String]>),
    Borrowed(&'a [&'a str]),
}

impl LogInput<'_> {
    /// Normalized line view. Text is split on `\n` and `\r\n`.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => split_lines(text),
            Self::Lines(lines) => lines.iter().map(String::as_str).collect(),
            Self::Borrowed(lines) => lines.to_vec(),
        }
    }
}

impl<'a> From<&'a str> for LogInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for LogInput<'_> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a [String]> for LogInput<'a> {
    fn from(lines: &'a [String]) -> Self {
        Self::Lines(Cow::Borrowed(lines))
    }
}

impl<'a> From<&'a Vec<String>> for LogInput<'a> {
    fn from(lines: &'a Vec<String>) -> Self {
        Self::Lines(Cow::Borrowed(lines.as_slice()))
    }
}

impl From<Vec<String>> for LogInput<'_> {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(Cow::Owned(lines))
    }
}

impl<'a> From<&'a [&'a str]> for LogInput<'a> {
    fn from(lines: &'a [&'a str]) -> Self {
        Self::Borrowed(lines)
    }
}

impl<'a> From<&'a Vec<&'a str>> for LogInput<'a> {
    fn from(lines: &'a Vec<&'a str>) -> Self {
        Self::Borrowed(lines.as_slice())
    }
}

/// Split on line breaks (`\n` or `\r\n`). A trailing break yields a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Immutable rule and error pattern configuration plus the render pass over it.
///
/// Cloning is cheap and clones share configuration, so one pipeline can serve many
/// threads.
#[derive(Clone, Debug)]
pub struct Pipeline {
    rules: Arc<[MatcherRule]>,
    error_patterns: Arc<[ErrorPattern]>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Rules are ranked by their position in `rules`
    pub fn new(rules: Vec<MatcherRule>, error_patterns: Vec<ErrorPattern>) -> Self {
        let rules: Vec<_> = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule.with_index(index))
            .collect();

        Self {
            rules: rules.into(),
            error_patterns: error_patterns.into(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &[MatcherRule] {
        &self.rules
    }

    pub fn error_patterns(&self) -> &[ErrorPattern] {
        &self.error_patterns
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Render a whole log
    pub fn render<'a>(&self, log: impl Into<LogInput<'a>>) -> RenderModel {
        let input = log.into();
        self.render_lines(&input.lines())
    }

    /// Render pre-split lines
    pub fn render_lines<S: AsRef<str>>(&self, lines: &[S]) -> RenderModel {
        let rows = self.render_rows(0, lines);
        let model = RenderModel::new(rows, lines.len());
        tracing::debug!(
            lines = lines.len(),
            rows = model.len(),
            error_rows = model.error_rows().len(),
            "rendered log"
        );
        model
    }

    /// Render `appended` lines after the lines `previous` was rendered from.
    ///
    /// Segmentation is line-local, so the rows of `previous` are reused as they are
    /// and the result equals rendering the concatenated log in one go.
    pub fn extend<S: AsRef<str>>(&self, previous: &RenderModel, appended: &[S]) -> RenderModel {
        let offset = previous.line_count();
        let mut rows = previous.rows().to_vec();
        rows.extend(self.render_rows(offset, appended));

        let model = RenderModel::new(rows, offset + appended.len());
        tracing::debug!(
            reused = previous.len(),
            appended = appended.len(),
            rows = model.len(),
            "extended render model"
        );
        model
    }

    fn render_rows<S: AsRef<str>>(&self, first_line: usize, lines: &[S]) -> Vec<RenderRow> {
        let mut particles = Vec::with_capacity(lines.len());
        for (offset, line) in lines.iter().enumerate() {
            segment_line_into(first_line + offset, line.as_ref(), &self.rules, &mut particles);
        }
        particles.into_iter().map(|p| self.render_particle(p)).collect()
    }

    /// Decode, linkify and match one particle. The row index is assigned later.
    pub fn render_particle(&self, particle: Particle) -> RenderRow {
        let segments = decode(&particle.content, self.options.use_symbolic_colors);
        let matches = self.match_segments(&segments);
        let links = segments
            .iter()
            .map(|segment| self.link_parts(segment))
            .collect();

        RenderRow {
            index: 0,
            particle,
            segments,
            matches,
            links,
        }
    }

    fn match_segments(&self, segments: &[StyledSegment]) -> Vec<ErrorMatch> {
        let mut matches = Vec::new();
        for (segment_index, segment) in segments.iter().enumerate() {
            for pattern in match_errors(segment, &self.error_patterns) {
                matches.push(ErrorMatch {
                    pattern_tag: pattern.tag().to_string(),
                    segment_index,
                });
            }
        }
        matches
    }

    fn link_parts(&self, segment: &StyledSegment) -> Vec<LinkPart> {
        if self.options.linkify {
            extract_links(&segment.text)
        } else {
            vec![LinkPart::text(segment.text.clone())]
        }
    }
}

/// Render a log with the given rules and error patterns and default options
pub fn render<'a>(
    log: impl Into<LogInput<'a>>,
    rules: &[MatcherRule],
    error_patterns: &[ErrorPattern],
) -> RenderModel {
    Pipeline::new(rules.to_vec(), error_patterns.to_vec()).render(log)
}
