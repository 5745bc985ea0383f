//! Raw page-text cleanup
//!
//! Extracted page text carries running headers and exam-platform
//! boilerplate that would confuse segmentation and matching; both are
//! stripped before the text is handed on.

use regex::Regex;

/// Strips known non-answer content from extracted page text
#[derive(Debug)]
pub struct Normalizer {
    patterns: Vec<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            patterns: vec![
                // Running page header of the form "3 /12"
                Regex::new(r"(?m)^\d+ /\d+\s*").expect("header pattern"),
                // Editor chrome emitted by the exam platform
                Regex::new(
                    r"Word Processing area.*?- use the shortcut keys to copy from the spreadsheet\s*",
                )
                .expect("boilerplate pattern"),
            ],
        }
    }
}

impl Normalizer {
    /// Normalizer with additional boilerplate patterns on top of the
    /// defaults
    pub fn with_patterns(extra: Vec<Regex>) -> Self {
        let mut normalizer = Self::default();
        normalizer.patterns.extend(extra);
        normalizer
    }

    /// Remove every configured pattern and trim the result
    pub fn normalize(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for pattern in &self.patterns {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        cleaned.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_running_headers() {
        let normalizer = Normalizer::default();
        let text = "1 /4\nThe answer is equity.\n2 /4\nSecond page line.";
        assert_eq!(
            normalizer.normalize(text),
            "The answer is equity.\nSecond page line."
        );
    }

    #[test]
    fn strips_platform_boilerplate() {
        let normalizer = Normalizer::default();
        let text = "Word Processing area below - use the shortcut keys to copy from the spreadsheet The real answer.";
        assert_eq!(normalizer.normalize(text), "The real answer.");
    }

    #[test]
    fn keeps_ordinary_text_intact() {
        let normalizer = Normalizer::default();
        let text = "2.1 Revenue grew by 4 / 5 of forecast.";
        assert_eq!(normalizer.normalize(text), text);
    }

    #[test]
    fn extra_patterns_apply_after_defaults() {
        let normalizer =
            Normalizer::with_patterns(vec![Regex::new(r"(?m)^DRAFT\s*").expect("pattern")]);
        assert_eq!(normalizer.normalize("DRAFT\nkept line"), "kept line");
    }
}
