//! Shared types for foldlog
//!
//! This crate contains the render model produced by `foldlog-core` and consumed by
//! whatever rendering layer sits on top of it (a terminal view, a JSON dump, ...).

use ratatui::style::{Color, Modifier, Style};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Segmentation Types
// ============================================================================

/// Whether a particle is plain text or a collapsible fold region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Text,
    Fold,
}

/// A contiguous slice of one log line
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Particle {
    pub kind: ParticleKind,

    /// Raw slice of the source line, escape sequences included
    pub content: String,

    /// Resolved fold label (fold particles only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Whether the UI should start with this region collapsed
    pub folded_by_default: bool,

    /// Index of the source line this particle was cut from
    pub line: usize,
}

impl Particle {
    pub fn text(line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: ParticleKind::Text,
            content: content.into(),
            label: None,
            folded_by_default: false,
            line,
        }
    }

    pub fn fold(
        line: usize,
        content: impl Into<String>,
        label: impl Into<String>,
        folded_by_default: bool,
    ) -> Self {
        Self {
            kind: ParticleKind::Fold,
            content: content.into(),
            label: Some(label.into()),
            folded_by_default,
            line,
        }
    }

    pub fn is_fold(&self) -> bool {
        self.kind == ParticleKind::Fold
    }
}

// ============================================================================
// Styling Types
// ============================================================================

/// A color reference carried by a styled segment.
///
/// The decoder emits either symbolic class names (`ansi-red`, `ansi-palette-208`,
/// `ansi-truecolor-10-20-30`) or concrete RGB values, depending on configuration.
/// Both forms describe the same underlying SGR code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRef {
    Class(String),
    Rgb(u8, u8, u8),
}

impl ColorRef {
    /// Map this reference onto a terminal color for a ratatui based renderer
    pub fn to_color(&self) -> Option<Color> {
        match self {
            Self::Rgb(r, g, b) => Some(Color::Rgb(*r, *g, *b)),
            Self::Class(class) => class_to_color(class),
        }
    }
}

fn class_to_color(class: &str) -> Option<Color> {
    let name = class.strip_prefix("ansi-")?;

    if let Some(index) = name.strip_prefix("palette-") {
        return index.parse().ok().map(Color::Indexed);
    }

    if let Some(rgb) = name.strip_prefix("truecolor-") {
        let mut parts = rgb.splitn(3, '-').map(str::parse::<u8>);
        return match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Some(Color::Rgb(r, g, b)),
            _ => None,
        };
    }

    let color = match name {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::Gray,
        "bright-black" => Color::DarkGray,
        "bright-red" => Color::LightRed,
        "bright-green" => Color::LightGreen,
        "bright-yellow" => Color::LightYellow,
        "bright-blue" => Color::LightBlue,
        "bright-magenta" => Color::LightMagenta,
        "bright-cyan" => Color::LightCyan,
        "bright-white" => Color::White,
        _ => return None,
    };
    Some(color)
}

/// Text decorations toggled by SGR codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoration {
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    Reverse,
    Hidden,
    Strikethrough,
}

impl Decoration {
    /// CSS-style class name for this decoration
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Bold => "ansi-bold",
            Self::Dim => "ansi-dim",
            Self::Italic => "ansi-italic",
            Self::Underline => "ansi-underline",
            Self::Blink => "ansi-blink",
            Self::Reverse => "ansi-reverse",
            Self::Hidden => "ansi-hidden",
            Self::Strikethrough => "ansi-strikethrough",
        }
    }

    pub fn modifier(&self) -> Modifier {
        match self {
            Self::Bold => Modifier::BOLD,
            Self::Dim => Modifier::DIM,
            Self::Italic => Modifier::ITALIC,
            Self::Underline => Modifier::UNDERLINED,
            Self::Blink => Modifier::SLOW_BLINK,
            Self::Reverse => Modifier::REVERSED,
            Self::Hidden => Modifier::HIDDEN,
            Self::Strikethrough => Modifier::CROSSED_OUT,
        }
    }
}

/// A run of decoded text sharing one visual style
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StyledSegment {
    /// Visible text, escape sequences removed
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<ColorRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorRef>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub decorations: BTreeSet<Decoration>,
}

impl StyledSegment {
    /// Create an unstyled segment
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// True when the segment carries no color or decoration
    pub fn is_plain(&self) -> bool {
        self.foreground.is_none() && self.background.is_none() && self.decorations.is_empty()
    }

    /// Class names for the decorations, in a stable order
    pub fn style_classes(&self) -> Vec<&'static str> {
        self.decorations.iter().map(Decoration::class_name).collect()
    }

    /// Equivalent ratatui style
    pub fn style(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.foreground.as_ref().and_then(ColorRef::to_color) {
            style = style.fg(fg);
        }
        if let Some(bg) = self.background.as_ref().and_then(ColorRef::to_color) {
            style = style.bg(bg);
        }
        for decoration in &self.decorations {
            style = style.add_modifier(decoration.modifier());
        }
        style
    }
}

// ============================================================================
// Annotation Types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Text,
    Url,
}

/// One piece of a linkified segment
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LinkPart {
    pub kind: LinkKind,
    pub value: String,
}

impl LinkPart {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Text,
            value: value.into(),
        }
    }

    pub fn url(value: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Url,
            value: value.into(),
        }
    }

    pub fn is_url(&self) -> bool {
        self.kind == LinkKind::Url
    }
}

/// Association between an error pattern and the segment it matched
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorMatch {
    pub pattern_tag: String,
    pub segment_index: usize,
}

// ============================================================================
// Render Model
// ============================================================================

/// Everything the rendering layer needs for one particle
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderRow {
    /// Position of this row in the model (display line number - 1)
    pub index: usize,

    pub particle: Particle,

    pub segments: Vec<StyledSegment>,

    /// Error matches over `segments`, ordered by segment then pattern
    pub matches: Vec<ErrorMatch>,

    /// Link parts, one list per segment
    pub links: Vec<Vec<LinkPart>>,
}

impl RenderRow {
    /// 1-based line number shown in the gutter
    pub fn line_number(&self) -> usize {
        self.index + 1
    }

    pub fn has_errors(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Decoded text of the whole row
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Ordered rows for a whole log plus an index of rows that carry errors
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    rows: Vec<RenderRow>,

    /// Number of source lines the rows were produced from
    line_count: usize,

    /// Row indexes with at least one error match
    error_rows: Vec<usize>,
}

impl RenderModel {
    /// Build a model, re-indexing rows and populating the error index
    pub fn new(mut rows: Vec<RenderRow>, line_count: usize) -> Self {
        let mut error_rows = Vec::new();
        for (index, row) in rows.iter_mut().enumerate() {
            row.index = index;
            if row.has_errors() {
                error_rows.push(index);
            }
        }

        Self {
            rows,
            line_count,
            error_rows,
        }
    }

    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RenderRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn has_errors(&self) -> bool {
        !self.error_rows.is_empty()
    }

    pub fn error_rows(&self) -> &[usize] {
        &self.error_rows
    }

    /// Error matches for a row (empty when the row is clean or out of range)
    pub fn errors_for(&self, row: usize) -> &[ErrorMatch] {
        self.rows.get(row).map(|r| r.matches.as_slice()).unwrap_or(&[])
    }

    /// Number of rows each error tag was found on
    pub fn error_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for &index in &self.error_rows {
            let tags: BTreeSet<&str> = self.rows[index]
                .matches
                .iter()
                .map(|m| m.pattern_tag.as_str())
                .collect();
            for tag in tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Fold rows with their default collapse state, for initialising a toggle map
    pub fn fold_rows(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.rows
            .iter()
            .filter(|r| r.particle.is_fold())
            .map(|r| (r.index, &r.particle))
    }

    pub fn into_rows(self) -> Vec<RenderRow> {
        self.rows
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(text: &str, tags: &[&str]) -> RenderRow {
        RenderRow {
            index: 99,
            particle: Particle::text(0, text),
            segments: vec![StyledSegment::plain(text)],
            matches: tags
                .iter()
                .map(|t| ErrorMatch {
                    pattern_tag: t.to_string(),
                    segment_index: 0,
                })
                .collect(),
            links: vec![vec![LinkPart::text(text)]],
        }
    }

    #[test]
    fn test_model_indexes_rows_and_errors() {
        let model = RenderModel::new(
            vec![row("ok", &[]), row("boom", &["error"]), row("fine", &[])],
            3,
        );
        assert_eq!(model.len(), 3);
        assert_eq!(model.row(2).unwrap().index, 2);
        assert_eq!(model.row(2).unwrap().line_number(), 3);
        assert_eq!(model.error_rows(), &[1]);
        assert!(model.has_errors());
        assert_eq!(model.errors_for(1)[0].pattern_tag, "error");
        assert!(model.errors_for(0).is_empty());
        assert!(model.errors_for(42).is_empty());
    }

    #[test]
    fn test_error_counts_count_rows_once_per_tag() {
        let model = RenderModel::new(
            vec![row("a", &["error", "error"]), row("b", &["error", "npm"])],
            2,
        );
        let counts = model.error_counts();
        assert_eq!(counts.get("error"), Some(&2));
        assert_eq!(counts.get("npm"), Some(&1));
    }

    #[test]
    fn test_fold_rows() {
        let mut fold = row("x", &[]);
        fold.particle = Particle::fold(0, "x", "install", true);
        let model = RenderModel::new(vec![row("a", &[]), fold], 1);
        let folds: Vec<_> = model.fold_rows().collect();
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].0, 1);
        assert_eq!(folds[0].1.label.as_deref(), Some("install"));
        assert!(folds[0].1.folded_by_default);
    }

    #[test]
    fn test_class_colors_map_to_terminal_colors() {
        assert_eq!(
            ColorRef::Class("ansi-red".into()).to_color(),
            Some(Color::Red)
        );
        assert_eq!(
            ColorRef::Class("ansi-bright-black".into()).to_color(),
            Some(Color::DarkGray)
        );
        assert_eq!(
            ColorRef::Class("ansi-palette-208".into()).to_color(),
            Some(Color::Indexed(208))
        );
        assert_eq!(
            ColorRef::Class("ansi-truecolor-1-2-3".into()).to_color(),
            Some(Color::Rgb(1, 2, 3))
        );
        assert_eq!(ColorRef::Class("nope".into()).to_color(), None);
        assert_eq!(ColorRef::Rgb(9, 8, 7).to_color(), Some(Color::Rgb(9, 8, 7)));
    }

    #[test]
    fn test_segment_style() {
        let mut segment = StyledSegment::plain("warn");
        assert!(segment.is_plain());

        segment.foreground = Some(ColorRef::Rgb(187, 0, 0));
        segment.decorations.insert(Decoration::Underline);
        segment.decorations.insert(Decoration::Bold);

        let style = segment.style();
        assert_eq!(style.fg, Some(Color::Rgb(187, 0, 0)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(segment.style_classes(), vec!["ansi-bold", "ansi-underline"]);
    }

    #[test]
    fn test_model_serializes_to_json() {
        let model = RenderModel::new(vec![row("hello", &[])], 1);
        let json = model.to_json_pretty().unwrap();
        assert!(json.contains("\"kind\": \"text\""));
        assert!(json.contains("\"content\": \"hello\""));
        assert!(!json.contains("\"label\""));
    }
}
