//! Property tests for the lossless guarantees of the render pipeline.
//!
//! Inputs are drawn from an alphabet heavy in marker characters, escapes, carriage
//! returns and URL fragments so that overlapping and unterminated regions show up
//! often.

use foldlog_core::{
    decode, extract_links, normalize_carriage_returns, segment, strip_escapes, ErrorPattern,
    MatcherRule, Pipeline,
};
use proptest::prelude::*;

fn rules() -> Vec<MatcherRule> {
    vec![
        MatcherRule::new(r"\[(\w*)", r"\]", "$1").unwrap(),
        MatcherRule::new("<<", ">>", "$4").unwrap().folded(),
        MatcherRule::new("a", "a", "aa").unwrap(),
    ]
}

fn log_line() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("[".to_string()),
            Just("]".to_string()),
            Just("<<".to_string()),
            Just(">>".to_string()),
            Just("a".to_string()),
            Just(" ".to_string()),
            Just("\r".to_string()),
            Just("\x1b[31m".to_string()),
            Just("\x1b[0m".to_string()),
            Just("\x1b[".to_string()),
            Just("https://ci.example.com/x".to_string()),
            Just("é".to_string()),
            "[a-z]{1,4}",
        ],
        0..24,
    )
    .prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn segmentation_reconstructs_each_line(lines in prop::collection::vec(log_line(), 0..6)) {
        let particles = segment(&lines, &rules());

        for (index, line) in lines.iter().enumerate() {
            let rebuilt: String = particles
                .iter()
                .filter(|p| p.line == index)
                .map(|p| p.content.as_str())
                .collect();
            prop_assert_eq!(&rebuilt, line);
        }
        prop_assert!(particles.iter().all(|p| !p.content.is_empty()));
    }

    #[test]
    fn decoded_text_is_the_stripped_normalized_text(line in log_line(), symbolic in any::<bool>()) {
        let decoded: String = decode(&line, symbolic).iter().map(|s| s.text.as_str()).collect();
        prop_assert_eq!(decoded, strip_escapes(&normalize_carriage_returns(&line)));
    }

    #[test]
    fn links_reconstruct_text(text in log_line()) {
        let joined: String = extract_links(&text).iter().map(|p| p.value.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn render_is_idempotent(lines in prop::collection::vec(log_line(), 0..6)) {
        let pipeline = Pipeline::new(rules(), vec![ErrorPattern::regex("err", "a a").unwrap()]);
        prop_assert_eq!(pipeline.render(&lines), pipeline.render(&lines));
    }

    #[test]
    fn extend_equals_full_render(
        head in prop::collection::vec(log_line(), 0..4),
        tail in prop::collection::vec(log_line(), 0..4),
    ) {
        let pipeline = Pipeline::new(rules(), Vec::new());
        let all: Vec<String> = head.iter().chain(tail.iter()).cloned().collect();

        let extended = pipeline.extend(&pipeline.render(&head), &tail);
        prop_assert_eq!(extended, pipeline.render(&all));
    }
}
