//! Rule-based answer segmentation
//!
//! Splits a region of (already normalized) answer text into
//! question-indexed chunks at lines that open with a question label.
//! This is the fallback segmentation; richer semantic mapping is owned
//! by the extraction collaborator. Text with no labels at all becomes a
//! single chunk under the target question number.

use crate::text::labels::leading_label;
use serde::Serialize;

/// One question-indexed slice of a student's answer text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerChunk {
    pub question_number: String,
    pub body: String,
}

/// Segment `text` into chunks keyed by the labels that open its lines.
/// Unlabelled leading text is attributed to `question_number`.
pub fn segment_answers(text: &str, question_number: &str) -> Vec<AnswerChunk> {
    let mut chunks: Vec<AnswerChunk> = Vec::new();
    let mut current_label = question_number.to_string();
    let mut current_body: Vec<String> = Vec::new();

    let mut flush = |label: &str, body: &mut Vec<String>, chunks: &mut Vec<AnswerChunk>| {
        let joined = body.join("\n").trim().to_string();
        body.clear();
        if !joined.is_empty() {
            chunks.push(AnswerChunk {
                question_number: label.to_string(),
                body: joined,
            });
        }
    };

    for line in text.lines() {
        if let Some(token) = leading_label(line) {
            flush(&current_label, &mut current_body, &mut chunks);
            current_label = token.label.clone();
            let rest = line.trim_start()[token.range.end..].trim();
            if !rest.is_empty() {
                current_body.push(rest.to_string());
            }
        } else {
            current_body.push(line.to_string());
        }
    }
    flush(&current_label, &mut current_body, &mut chunks);

    chunks
}
