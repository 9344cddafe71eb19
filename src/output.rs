//! Plain text and JSON output for a render model

use std::io::{self, Write};

use ratatui::crossterm::style::{Attribute, ContentStyle, StyledContent};
use ratatui::style::{Modifier, Style};

use foldlog_types::{RenderModel, RenderRow};

const ATTRIBUTES: [(Modifier, Attribute); 8] = [
    (Modifier::BOLD, Attribute::Bold),
    (Modifier::DIM, Attribute::Dim),
    (Modifier::ITALIC, Attribute::Italic),
    (Modifier::UNDERLINED, Attribute::Underlined),
    (Modifier::SLOW_BLINK, Attribute::SlowBlink),
    (Modifier::REVERSED, Attribute::Reverse),
    (Modifier::HIDDEN, Attribute::Hidden),
    (Modifier::CROSSED_OUT, Attribute::CrossedOut),
];

/// Switches for text output
#[derive(Clone, Copy, Debug, Default)]
pub struct TextOptions {
    /// Show the content of folds that start collapsed
    pub expand: bool,

    /// Only print rows with error matches
    pub errors_only: bool,

    /// Keep segment colors and decorations as terminal escapes
    pub color: bool,
}

/// Write the model as numbered rows: `NNNNN M content`, with `M` = `!` on error rows
pub fn write_text(
    out: &mut impl Write,
    model: &RenderModel,
    options: TextOptions,
) -> io::Result<()> {
    for row in model.rows() {
        if options.errors_only && !row.has_errors() {
            continue;
        }
        write_row(out, row, options)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, row: &RenderRow, options: TextOptions) -> io::Result<()> {
    let marker = if row.has_errors() { '!' } else { ' ' };
    let gutter = format!("{:>5} {}", row.line_number(), marker);

    let particle = &row.particle;
    if !particle.is_fold() {
        write!(out, "{} ", gutter)?;
        write_content(out, row, options.color)?;
        return writeln!(out);
    }

    let label = particle.label.as_deref().unwrap_or_default();
    if particle.folded_by_default && !options.expand {
        return writeln!(out, "{} ▸ {}", gutter, label);
    }

    writeln!(out, "{} ▾ {}", gutter, label)?;
    write!(out, "{:>5}   │ ", "")?;
    write_content(out, row, options.color)?;
    writeln!(out)
}

fn write_content(out: &mut impl Write, row: &RenderRow, color: bool) -> io::Result<()> {
    for segment in &row.segments {
        if color && !segment.is_plain() {
            let styled = StyledContent::new(content_style(segment.style()), segment.text.as_str());
            write!(out, "{}", styled)?;
        } else {
            out.write_all(segment.text.as_bytes())?;
        }
    }
    Ok(())
}

/// Terminal escape style for a segment style
fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = style.fg.map(Into::into);
    content.background_color = style.bg.map(Into::into);
    for (modifier, attribute) in ATTRIBUTES {
        if style.add_modifier.contains(modifier) {
            content.attributes.set(attribute);
        }
    }
    content
}

/// Write a one-line-per-tag error summary
pub fn write_summary(out: &mut impl Write, model: &RenderModel) -> io::Result<()> {
    if !model.has_errors() {
        return Ok(());
    }
    writeln!(out, "{} row(s) with errors:", model.error_rows().len())?;
    for (tag, count) in model.error_counts() {
        writeln!(out, "  {:<16} {}", tag, count)?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, model: &RenderModel) -> anyhow::Result<()> {
    writeln!(out, "{}", model.to_json_pretty()?)?;
    Ok(())
}
