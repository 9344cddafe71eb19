//! Line-local fold segmentation.
//!
//! Each line is scanned repeatedly from a cursor. At every step the rule whose start
//! pattern matches earliest wins (list order breaks ties), its end pattern is searched
//! from the end of the start match, and the region between is cut out as a fold
//! particle. Whatever is left over becomes text. Concatenating the particles of a
//! line always gives back the line.

use regex::Captures;

use foldlog_types::Particle;

use crate::rules::MatcherRule;

/// Winning start match for one scan step
struct StartMatch<'r, 'h> {
    rule: &'r MatcherRule,
    start: usize,
    end: usize,
    captures: Captures<'h>,
}

/// Split every line into particles
pub fn segment<S: AsRef<str>>(lines: &[S], rules: &[MatcherRule]) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        segment_line_into(index, line.as_ref(), rules, &mut particles);
    }
    particles
}

/// Split a single line into particles
pub fn segment_line(index: usize, line: &str, rules: &[MatcherRule]) -> Vec<Particle> {
    let mut particles = Vec::new();
    segment_line_into(index, line, rules, &mut particles);
    particles
}

pub(crate) fn segment_line_into(
    index: usize,
    line: &str,
    rules: &[MatcherRule],
    out: &mut Vec<Particle>,
) {
    let first = out.len();
    let mut cursor = 0;

    while cursor < line.len() {
        let Some(start) = earliest_start(line, cursor, rules) else {
            out.push(Particle::text(index, &line[cursor..]));
            break;
        };

        let Some(end) = start.rule.end().find_at(line, start.end) else {
            tracing::debug!(
                line = index,
                rule = start.rule.index(),
                offset = start.start,
                "fold start without matching end, keeping remainder as text"
            );
            out.push(Particle::text(index, &line[cursor..]));
            break;
        };

        // An empty region cannot advance the cursor
        if end.end() == start.start {
            out.push(Particle::text(index, &line[cursor..]));
            break;
        }

        if start.start > cursor {
            out.push(Particle::text(index, &line[cursor..start.start]));
        }

        let label = start.rule.label_or_fallback(&start.captures);
        out.push(Particle::fold(
            index,
            &line[start.start..end.end()],
            label,
            start.rule.fold_by_default(),
        ));

        cursor = end.end();
    }

    tracing::trace!(line = index, particles = out.len() - first, "segmented line");
}

/// Rule with the earliest start match at or after `cursor`. Earlier rules win ties.
fn earliest_start<'r, 'h>(
    line: &'h str,
    cursor: usize,
    rules: &'r [MatcherRule],
) -> Option<StartMatch<'r, 'h>> {
    let mut best: Option<StartMatch<'r, 'h>> = None;

    for rule in rules {
        let Some(captures) = rule.start().captures_at(line, cursor) else {
            continue;
        };
        let Some(whole) = captures.get(0) else {
            continue;
        };

        let is_earlier = match &best {
            Some(current) => whole.start() < current.start,
            None => true,
        };
        if is_earlier {
            best = Some(StartMatch {
                rule,
                start: whole.start(),
                end: whole.end(),
                captures,
            });
        }
    }

    best
}
