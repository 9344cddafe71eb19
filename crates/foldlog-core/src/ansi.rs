//! ANSI escape decoding.
//!
//! Decoding happens in two passes. Carriage returns are resolved first, the way a
//! terminal would draw them, so only the text still visible on each terminal line
//! survives. The result is then scanned for escape sequences: SGR sequences update
//! the running style, every other complete sequence is dropped, and malformed or
//! truncated sequences are kept as literal text.

use std::borrow::Cow;
use std::collections::BTreeSet;

use foldlog_types::{ColorRef, Decoration, StyledSegment};

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Class names and RGB values for the 16 standard colors
const NAMED_COLORS: [(&str, (u8, u8, u8)); 16] = [
    ("ansi-black", (0, 0, 0)),
    ("ansi-red", (187, 0, 0)),
    ("ansi-green", (0, 187, 0)),
    ("ansi-yellow", (187, 187, 0)),
    ("ansi-blue", (0, 0, 187)),
    ("ansi-magenta", (187, 0, 187)),
    ("ansi-cyan", (0, 187, 187)),
    ("ansi-white", (255, 255, 255)),
    ("ansi-bright-black", (85, 85, 85)),
    ("ansi-bright-red", (255, 85, 85)),
    ("ansi-bright-green", (0, 255, 0)),
    ("ansi-bright-yellow", (255, 255, 85)),
    ("ansi-bright-blue", (85, 85, 255)),
    ("ansi-bright-magenta", (255, 85, 255)),
    ("ansi-bright-cyan", (85, 255, 255)),
    ("ansi-bright-white", (255, 255, 255)),
];

// 256-color palette layout
const COLOR_CUBE_OFFSET: u8 = 16;
const COLOR_CUBE_SIZE: u8 = 6;
const GRAYSCALE_OFFSET: u8 = 232;
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// A color as selected by an SGR code, before it is rendered as a reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnsiColor {
    /// Index into the 256-color palette (0-15 are the named colors)
    Palette(u8),
    /// 24-bit color
    Rgb(u8, u8, u8),
}

impl AnsiColor {
    /// Concrete RGB value for this color
    pub fn rgb(&self) -> (u8, u8, u8) {
        match *self {
            Self::Rgb(r, g, b) => (r, g, b),
            Self::Palette(idx) if idx < COLOR_CUBE_OFFSET => NAMED_COLORS[idx as usize].1,
            Self::Palette(idx) if idx < GRAYSCALE_OFFSET => {
                let cube = idx - COLOR_CUBE_OFFSET;
                let r = cube / (COLOR_CUBE_SIZE * COLOR_CUBE_SIZE);
                let g = (cube / COLOR_CUBE_SIZE) % COLOR_CUBE_SIZE;
                let b = cube % COLOR_CUBE_SIZE;
                (
                    CUBE_LEVELS[r as usize],
                    CUBE_LEVELS[g as usize],
                    CUBE_LEVELS[b as usize],
                )
            }
            Self::Palette(idx) => {
                let level = (idx - GRAYSCALE_OFFSET) * 10 + 8;
                (level, level, level)
            }
        }
    }

    /// Symbolic class name for this color
    pub fn class_name(&self) -> String {
        match *self {
            Self::Palette(idx) if idx < COLOR_CUBE_OFFSET => {
                NAMED_COLORS[idx as usize].0.to_string()
            }
            Self::Palette(idx) => format!("ansi-palette-{idx}"),
            Self::Rgb(r, g, b) => format!("ansi-truecolor-{r}-{g}-{b}"),
        }
    }

    pub fn to_ref(&self, symbolic: bool) -> ColorRef {
        if symbolic {
            ColorRef::Class(self.class_name())
        } else {
            let (r, g, b) = self.rgb();
            ColorRef::Rgb(r, g, b)
        }
    }
}

/// Running SGR state. Carry it between calls to decode a stream in pieces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SgrState {
    pub foreground: Option<AnsiColor>,
    pub background: Option<AnsiColor>,
    pub decorations: BTreeSet<Decoration>,
}

impl SgrState {
    pub fn is_reset(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the parameter bytes of one `ESC [ ... m` sequence.
    /// Parameters that are not plain decimal numbers make the whole sequence a no-op.
    pub fn apply(&mut self, params: &str) {
        let Some(codes) = parse_params(params) else {
            return;
        };

        let mut codes = codes.into_iter();
        while let Some(code) = codes.next() {
            match code {
                0 => *self = Self::default(),
                1 => self.set(Decoration::Bold),
                2 => self.set(Decoration::Dim),
                3 => self.set(Decoration::Italic),
                4 => self.set(Decoration::Underline),
                5 | 6 => self.set(Decoration::Blink),
                7 => self.set(Decoration::Reverse),
                8 => self.set(Decoration::Hidden),
                9 => self.set(Decoration::Strikethrough),
                21 => self.unset(Decoration::Bold),
                22 => {
                    self.unset(Decoration::Bold);
                    self.unset(Decoration::Dim);
                }
                23 => self.unset(Decoration::Italic),
                24 => self.unset(Decoration::Underline),
                25 => self.unset(Decoration::Blink),
                27 => self.unset(Decoration::Reverse),
                28 => self.unset(Decoration::Hidden),
                29 => self.unset(Decoration::Strikethrough),
                30..=37 => self.foreground = Some(AnsiColor::Palette((code - 30) as u8)),
                38 => match extended_color(&mut codes) {
                    Some(color) => self.foreground = Some(color),
                    None => break,
                },
                39 => self.foreground = None,
                40..=47 => self.background = Some(AnsiColor::Palette((code - 40) as u8)),
                48 => match extended_color(&mut codes) {
                    Some(color) => self.background = Some(color),
                    None => break,
                },
                49 => self.background = None,
                90..=97 => self.foreground = Some(AnsiColor::Palette((code - 90 + 8) as u8)),
                100..=107 => self.background = Some(AnsiColor::Palette((code - 100 + 8) as u8)),
                _ => {}
            }
        }
    }

    /// One absolute SGR sequence (starting with a reset) that recreates this state
    pub fn to_escape(&self) -> String {
        let mut codes = vec!["0".to_string()];
        codes.extend(self.decorations.iter().map(|d| decoration_code(*d).to_string()));
        if let Some(color) = self.foreground {
            codes.push(color_code(color, 30, 90, 38));
        }
        if let Some(color) = self.background {
            codes.push(color_code(color, 40, 100, 48));
        }
        format!("\x1b[{}m", codes.join(";"))
    }

    fn set(&mut self, decoration: Decoration) {
        self.decorations.insert(decoration);
    }

    fn unset(&mut self, decoration: Decoration) {
        self.decorations.remove(&decoration);
    }

    fn segment(&self, text: String, symbolic: bool) -> StyledSegment {
        StyledSegment {
            text,
            foreground: self.foreground.map(|c| c.to_ref(symbolic)),
            background: self.background.map(|c| c.to_ref(symbolic)),
            decorations: self.decorations.clone(),
        }
    }
}

fn decoration_code(decoration: Decoration) -> u8 {
    match decoration {
        Decoration::Bold => 1,
        Decoration::Dim => 2,
        Decoration::Italic => 3,
        Decoration::Underline => 4,
        Decoration::Blink => 5,
        Decoration::Reverse => 7,
        Decoration::Hidden => 8,
        Decoration::Strikethrough => 9,
    }
}

/// SGR code for a color, given the bases for normal, bright and extended colors
fn color_code(color: AnsiColor, normal: u8, bright: u8, extended: u8) -> String {
    match color {
        AnsiColor::Palette(idx) if idx < 8 => (normal + idx).to_string(),
        AnsiColor::Palette(idx) if idx < COLOR_CUBE_OFFSET => (bright + idx - 8).to_string(),
        AnsiColor::Palette(idx) => format!("{extended};5;{idx}"),
        AnsiColor::Rgb(r, g, b) => format!("{extended};2;{r};{g};{b}"),
    }
}

/// Split SGR parameters. An empty parameter means 0.
fn parse_params(params: &str) -> Option<Vec<u32>> {
    if params.is_empty() {
        return Some(vec![0]);
    }
    params
        .split(';')
        .map(|p| if p.is_empty() { Ok(0) } else { p.parse::<u32>() })
        .collect::<Result<Vec<_>, _>>()
        .ok()
}

/// `5;N` (palette) or `2;R;G;B` (truecolor) following a 38/48 code
fn extended_color(codes: &mut impl Iterator<Item = u32>) -> Option<AnsiColor> {
    let byte = |v: Option<u32>| v.and_then(|v| u8::try_from(v).ok());
    match codes.next()? {
        5 => byte(codes.next()).map(AnsiColor::Palette),
        2 => {
            let r = byte(codes.next())?;
            let g = byte(codes.next())?;
            let b = byte(codes.next())?;
            Some(AnsiColor::Rgb(r, g, b))
        }
        _ => None,
    }
}

// ============================================================================
// Escape scanning
// ============================================================================

/// One lexical piece of escape-coded text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    /// Literal text, possibly including a stray ESC from a malformed sequence
    Text(&'a str),
    /// Parameters of a complete `ESC [ params m`
    Sgr { params: &'a str },
    /// Any other complete escape sequence
    Other,
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if rest.as_bytes()[0] == ESC {
            return Some(match escape_len(rest.as_bytes()) {
                Some(len) => {
                    let raw = &rest[..len];
                    self.pos += len;
                    match raw.as_bytes() {
                        [ESC, b'[', .., b'm'] => Token::Sgr {
                            params: &raw[2..len - 1],
                        },
                        _ => Token::Other,
                    }
                }
                None => {
                    self.pos += 1;
                    Token::Text(&rest[..1])
                }
            });
        }

        let len = rest.find('\x1b').unwrap_or(rest.len());
        self.pos += len;
        Some(Token::Text(&rest[..len]))
    }
}

/// Length of the complete escape sequence at the start of `bytes`, or `None` when it
/// is malformed or truncated.
fn escape_len(bytes: &[u8]) -> Option<usize> {
    match *bytes.get(1)? {
        b'[' => {
            let mut i = 2;
            while i < bytes.len() && (0x30..=0x3f).contains(&bytes[i]) {
                i += 1;
            }
            while i < bytes.len() && (0x20..=0x2f).contains(&bytes[i]) {
                i += 1;
            }
            match bytes.get(i).copied() {
                Some(0x40..=0x7e) => Some(i + 1),
                _ => None,
            }
        }
        // string sequences: OSC, DCS, SOS, PM, APC
        b']' | b'P' | b'X' | b'^' | b'_' => {
            let mut i = 2;
            while i < bytes.len() {
                match bytes[i] {
                    BEL => return Some(i + 1),
                    ESC if bytes.get(i + 1) == Some(&b'\\') => return Some(i + 2),
                    _ => i += 1,
                }
            }
            None
        }
        // charset designation takes one more byte
        b'(' | b')' | b'*' | b'+' => match bytes.get(2).copied() {
            Some(b) if b.is_ascii_graphic() => Some(3),
            _ => None,
        },
        0x30..=0x7e => Some(2),
        _ => None,
    }
}

/// Remove every escape sequence, keeping malformed ones as text
pub fn strip_escapes(text: &str) -> String {
    Scanner::new(text)
        .filter_map(|token| match token {
            Token::Text(text) => Some(text),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Carriage returns
// ============================================================================

/// One drawn column and the style it was drawn with
struct Cell<'a> {
    ch: &'a str,
    state: SgrState,
}

/// Draw one terminal line that contains `\r`, starting in `state`.
///
/// Text after a `\r` overwrites the line from its first column, character by
/// character; columns it does not reach keep their old content and style. Returns
/// the visible cells and the style in effect at the end of the line.
fn draw_line(line: &str, mut state: SgrState) -> (Vec<Cell<'_>>, SgrState) {
    let mut cells: Vec<Cell<'_>> = Vec::new();

    for chunk in line.split('\r') {
        let mut column = 0;
        for token in Scanner::new(chunk) {
            let text = match token {
                Token::Text(text) => text,
                Token::Sgr { params } => {
                    state.apply(params);
                    continue;
                }
                Token::Other => continue,
            };
            for (offset, ch) in text.char_indices() {
                let cell = Cell {
                    ch: &text[offset..offset + ch.len_utf8()],
                    state: state.clone(),
                };
                match cells.get_mut(column) {
                    Some(slot) => *slot = cell,
                    None => cells.push(cell),
                }
                column += 1;
            }
        }
    }

    (cells, state)
}

/// Resolve `\r` overwrites on every terminal line.
///
/// Only what a terminal would still show survives. `\r` directly before a newline
/// or at the end of input is a no-op. Lines with overwrites are re-encoded with one
/// absolute SGR sequence per style change; non-SGR escapes on those lines are dropped.
pub fn normalize_carriage_returns(text: &str) -> Cow<'_, str> {
    resolve_overwrites(text, SgrState::default())
}

/// [`normalize_carriage_returns`] for text whose first line starts in `state`
fn resolve_overwrites(text: &str, mut state: SgrState) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        if !line.contains('\r') {
            out.push_str(line);
            for token in Scanner::new(line) {
                if let Token::Sgr { params } = token {
                    state.apply(params);
                }
            }
            continue;
        }

        let (cells, end) = draw_line(line, state.clone());
        for cell in cells {
            if cell.state != state {
                out.push_str(&cell.state.to_escape());
                state = cell.state;
            }
            out.push_str(cell.ch);
        }
        if end != state {
            out.push_str(&end.to_escape());
            state = end;
        }
    }

    Cow::Owned(out)
}

// ============================================================================
// Decoding
// ============================================================================

/// Collects text into segments, starting a new one whenever the style changes
struct Runs {
    segments: Vec<StyledSegment>,
    text: String,
    state: SgrState,
    symbolic: bool,
}

impl Runs {
    fn new(state: SgrState, symbolic: bool) -> Self {
        Self {
            segments: Vec::new(),
            text: String::new(),
            state,
            symbolic,
        }
    }

    fn push(&mut self, text: &str, state: &SgrState) {
        if text.is_empty() {
            return;
        }
        if *state != self.state {
            self.flush();
            self.state = state.clone();
        }
        self.text.push_str(text);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.segments.push(self.state.segment(text, self.symbolic));
        }
    }

    fn finish(mut self) -> Vec<StyledSegment> {
        self.flush();
        self.segments
    }
}

/// Decode escape-coded text into styled segments, starting from the reset state
pub fn decode(text: &str, use_symbolic_colors: bool) -> Vec<StyledSegment> {
    decode_with_state(text, SgrState::default(), use_symbolic_colors).0
}

/// Decode starting from `state`, returning the segments and the state at the end of
/// the input so a following chunk can continue with the same style.
pub fn decode_with_state(
    text: &str,
    mut state: SgrState,
    use_symbolic_colors: bool,
) -> (Vec<StyledSegment>, SgrState) {
    let normalized = resolve_overwrites(text, state.clone());
    let mut runs = Runs::new(state.clone(), use_symbolic_colors);

    for token in Scanner::new(&normalized) {
        match token {
            Token::Text(text) => runs.push(text, &state),
            Token::Sgr { params } => state.apply(params),
            Token::Other => {}
        }
    }

    (runs.finish(), state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[StyledSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_decode_plain() {
        let segments = decode("hello", false);
        assert_eq!(segments, vec![StyledSegment::plain("hello")]);
    }

    #[test]
    fn test_decode_color() {
        let segments = decode("\x1b[31mred\x1b[0m", false);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "red");
        assert_eq!(segments[0].foreground, Some(ColorRef::Rgb(187, 0, 0)));
        assert_eq!(segments[0].background, None);
    }

    #[test]
    fn test_symbolic_and_rgb_describe_same_code() {
        let symbolic = decode("\x1b[1;91;44mx", true);
        let concrete = decode("\x1b[1;91;44mx", false);

        assert_eq!(
            symbolic[0].foreground,
            Some(ColorRef::Class("ansi-bright-red".into()))
        );
        assert_eq!(symbolic[0].background, Some(ColorRef::Class("ansi-blue".into())));
        assert_eq!(concrete[0].foreground, Some(ColorRef::Rgb(255, 85, 85)));
        assert_eq!(concrete[0].background, Some(ColorRef::Rgb(0, 0, 187)));
        assert_eq!(symbolic[0].decorations, concrete[0].decorations);
        assert!(symbolic[0].decorations.contains(&Decoration::Bold));
    }

    #[test]
    fn test_extended_colors() {
        let segments = decode("\x1b[38;5;208ma\x1b[48;2;10;20;30mb\x1b[38;5;244mc", false);
        assert_eq!(texts(&segments), vec!["a", "b", "c"]);
        assert_eq!(segments[0].foreground, Some(ColorRef::Rgb(255, 135, 0)));
        assert_eq!(segments[1].background, Some(ColorRef::Rgb(10, 20, 30)));
        assert_eq!(segments[2].foreground, Some(ColorRef::Rgb(128, 128, 128)));

        let symbolic = decode("\x1b[38;5;208ma\x1b[48;2;10;20;30mb", true);
        assert_eq!(
            symbolic[0].foreground,
            Some(ColorRef::Class("ansi-palette-208".into()))
        );
        assert_eq!(
            symbolic[1].background,
            Some(ColorRef::Class("ansi-truecolor-10-20-30".into()))
        );
    }

    #[test]
    fn test_runs_split_on_state_change_only() {
        let segments = decode("a\x1b[31mb\x1b[31mc\x1b[39md\x1b[0m\x1b[0me", false);
        assert_eq!(texts(&segments), vec!["a", "bc", "de"]);
        assert!(segments[0].is_plain());
        assert!(segments[2].is_plain());
    }

    #[test]
    fn test_decoration_toggles() {
        let segments = decode("\x1b[1;4mx\x1b[22my\x1b[24mz", false);
        assert_eq!(texts(&segments), vec!["x", "y", "z"]);
        assert!(segments[0].decorations.contains(&Decoration::Bold));
        assert!(!segments[1].decorations.contains(&Decoration::Bold));
        assert!(segments[1].decorations.contains(&Decoration::Underline));
        assert!(segments[2].is_plain());
    }

    #[test]
    fn test_empty_params_reset() {
        let segments = decode("\x1b[32mgo\x1b[mstop", false);
        assert_eq!(texts(&segments), vec!["go", "stop"]);
        assert!(segments[1].is_plain());
    }

    #[test]
    fn test_unsupported_sequences_are_stripped() {
        let text = "\x1b[2K\x1b[1Gclear\x1b]0;title\x07ed\x1b(B!\x1b=";
        let segments = decode(text, false);
        assert_eq!(texts(&segments), vec!["cleared!"]);
        assert!(segments[0].is_plain());
    }

    #[test]
    fn test_invalid_sgr_params_are_ignored() {
        let segments = decode("\x1b[3x1mtext", false);
        // not an SGR at all: final byte is 'x'
        assert_eq!(texts(&segments), vec!["1mtext"]);

        let segments = decode("\x1b[1:2mtext", false);
        assert_eq!(texts(&segments), vec!["text"]);
        assert!(segments[0].is_plain());
    }

    #[test]
    fn test_truncated_escape_is_literal() {
        let segments = decode("done\x1b[31", false);
        assert_eq!(texts(&segments), vec!["done\x1b[31"]);

        let segments = decode("osc\x1b]0;never ends", false);
        assert_eq!(texts(&segments), vec!["osc\x1b]0;never ends"]);

        let segments = decode("lone\x1b", false);
        assert_eq!(texts(&segments), vec!["lone\x1b"]);
    }

    #[test]
    fn test_truncated_extended_color_keeps_earlier_codes() {
        let segments = decode("\x1b[1;38;5mx", false);
        assert!(segments[0].decorations.contains(&Decoration::Bold));
        assert_eq!(segments[0].foreground, None);
    }

    #[test]
    fn test_carriage_overwrite() {
        assert_eq!(texts(&decode("abc\rdef", false)), vec!["def"]);
        assert_eq!(normalize_carriage_returns("abcdef\rxy"), "xycdef");
        assert_eq!(normalize_carriage_returns("10%\r20%\r30%"), "30%");
        assert_eq!(normalize_carriage_returns("one\r\ntwo\r"), "one\ntwo");
        assert_eq!(normalize_carriage_returns("a\rb\nc\rd"), "b\nd");
        assert!(matches!(normalize_carriage_returns("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_carriage_overwrite_keeps_escapes() {
        let normalized = normalize_carriage_returns("\x1b[32m 10%\x1b[0m\r\x1b[32m 20%\x1b[0m");
        assert_eq!(strip_escapes(&normalized), " 20%");

        let segments = decode("\x1b[32m 10%\x1b[0m\r\x1b[32m 20%\x1b[0m", false);
        assert_eq!(texts(&segments), vec![" 20%"]);
        assert_eq!(segments[0].foreground, Some(ColorRef::Rgb(0, 187, 0)));
    }

    #[test]
    fn test_overwrite_after_reset_is_unstyled() {
        let segments = decode("\x1b[33mwarn\x1b[0m\rok", false);
        assert_eq!(texts(&segments), vec!["ok", "rn"]);
        assert!(segments[0].is_plain());
        assert_eq!(segments[1].foreground, Some(ColorRef::Rgb(187, 187, 0)));

        assert_eq!(
            normalize_carriage_returns("\x1b[33mwarn\x1b[0m\rok"),
            "ok\x1b[0;33mrn\x1b[0m"
        );
    }

    #[test]
    fn test_overwrite_keeps_style_of_each_column() {
        // the second pass inherits bold, then switches to red for its last column
        let segments = decode("\x1b[1mabcd\rx\x1b[31my", false);
        assert_eq!(texts(&segments), vec!["x", "y", "cd"]);
        assert!(segments[0].decorations.contains(&Decoration::Bold));
        assert_eq!(segments[0].foreground, None);
        assert_eq!(segments[1].foreground, Some(ColorRef::Rgb(187, 0, 0)));
        assert!(segments[1].decorations.contains(&Decoration::Bold));
        assert_eq!(segments[2].foreground, None);
        assert!(segments[2].decorations.contains(&Decoration::Bold));
    }

    #[test]
    fn test_overwrite_starts_from_prior_state() {
        let mut prior = SgrState::default();
        prior.apply("32");

        let (segments, state) = decode_with_state("old\rnew\x1b[0m", prior.clone(), false);
        assert_eq!(texts(&segments), vec!["new"]);
        assert_eq!(segments[0].foreground, Some(ColorRef::Rgb(0, 187, 0)));
        assert!(state.is_reset());

        let (_, state) = decode_with_state("a\rb", prior.clone(), false);
        assert_eq!(state, prior);
    }

    #[test]
    fn test_escape_recreates_state() {
        let mut state = SgrState::default();
        state.apply("1;9;93;48;5;200");
        state.apply("38;2;1;2;3");

        let mut rebuilt = SgrState::default();
        rebuilt.apply("45");
        let escape = state.to_escape();
        rebuilt.apply(&escape[2..escape.len() - 1]);

        assert_eq!(rebuilt, state);
        assert_eq!(SgrState::default().to_escape(), "\x1b[0m");
    }

    #[test]
    fn test_state_carries_across_chunks() {
        let (first, state) = decode_with_state("\x1b[33mwarn", SgrState::default(), false);
        assert_eq!(first[0].foreground, Some(ColorRef::Rgb(187, 187, 0)));
        assert!(!state.is_reset());

        let (second, state) = decode_with_state("ing\x1b[0m", state, false);
        assert_eq!(second[0].text, "ing");
        assert_eq!(second[0].foreground, Some(ColorRef::Rgb(187, 187, 0)));
        assert!(state.is_reset());
    }

    #[test]
    fn test_empty_segments_are_omitted() {
        assert!(decode("", false).is_empty());
        assert!(decode("\x1b[31m\x1b[0m", false).is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let segments = decode("\x1b[36m─ 日本 ─\x1b[0m✓", true);
        assert_eq!(texts(&segments), vec!["─ 日本 ─", "✓"]);
    }
}
