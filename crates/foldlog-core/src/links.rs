use regex::Regex;
use std::sync::LazyLock;

use foldlog_types::LinkPart;

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&/=]*)",
    )
    .expect("link pattern is valid")
});

/// Split text into alternating text and URL parts.
///
/// Whitespace runs are always text. Each non-whitespace run is searched for URLs;
/// text around a URL inside the run becomes its own part. Concatenating the values
/// gives back the input.
pub fn extract_links(text: &str) -> Vec<LinkPart> {
    let mut parts = Vec::new();
    for (is_space, run) in runs(text) {
        if is_space {
            parts.push(LinkPart::text(run));
        } else {
            split_word(run, &mut parts);
        }
    }
    parts
}

fn split_word(word: &str, parts: &mut Vec<LinkPart>) {
    let mut rest = word;
    while !rest.is_empty() {
        let Some(found) = LINK_REGEX.find(rest) else {
            parts.push(LinkPart::text(rest));
            return;
        };
        if found.start() > 0 {
            parts.push(LinkPart::text(&rest[..found.start()]));
        }
        parts.push(LinkPart::url(found.as_str()));
        rest = &rest[found.end()..];
    }
}

/// Maximal runs of whitespace / non-whitespace
fn runs(text: &str) -> impl Iterator<Item = (bool, &str)> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let len = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != is_space)
            .map_or(rest.len(), |(i, _)| i);
        let (run, tail) = rest.split_at(len);
        rest = tail;
        Some((is_space, run))
    })
}
