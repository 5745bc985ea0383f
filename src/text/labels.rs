//! Question-label token grammar
//!
//! A question label is an integer, a literal `.`, one or more digits,
//! optionally followed by a parenthesized lowercase letter: `3.1`,
//! `12.4(b)`. A token must not be digit-adjacent on either side, so
//! labels are not picked out of longer numbers. The regex crate has no
//! lookaround, so the adjacency rule is checked against the neighboring
//! characters explicitly.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// A question-label token and its byte range within the scanned text
#[derive(Debug, Clone, PartialEq)]
pub struct LabelToken {
    pub label: String,
    pub range: Range<usize>,
}

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+(?:\([a-z]\))?").expect("label pattern"))
}

/// Find every question-label token in `text`, in text order
pub fn question_labels(text: &str) -> Vec<LabelToken> {
    let mut tokens = Vec::new();

    for m in pattern().find_iter(text) {
        let preceded_by_digit = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        let followed_by_digit = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if preceded_by_digit || followed_by_digit {
            continue;
        }

        tokens.push(LabelToken {
            label: m.as_str().to_string(),
            range: m.range(),
        });
    }

    tokens
}

/// Does `line` open with a question label (ignoring leading whitespace)?
pub fn leading_label(line: &str) -> Option<LabelToken> {
    let trimmed = line.trim_start();
    question_labels(trimmed)
        .into_iter()
        .find(|token| token.range.start == 0)
}
