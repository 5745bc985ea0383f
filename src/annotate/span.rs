//! Question-span location
//!
//! Finds every question-label occurrence on a page and assigns each a
//! vertical extent running from its own anchor down to the next
//! label's anchor (or the page bottom). Extents scope comment
//! placement; the marks-tally stoplist decides score eligibility.

use crate::error::Result;
use crate::pdf::{DocumentSurface, Rect};
use crate::text::labels::question_labels;
use std::ops::Range;
use tracing::{debug, warn};

/// Words that mark a text line as a marks tally rather than a question
/// heading (checked case-insensitively against the label's own line)
const SCORE_CONTEXT_STOPLIST: &[&str] = &["marks", "/", "score", "total"];

/// One question label anchored on a page
#[derive(Debug, Clone)]
pub struct QuestionSpan {
    pub label: String,
    /// Anchor: top of the label's bounding box
    pub y: f32,
    /// Bounding box of the label text
    pub rect: Rect,
    /// Byte range of the token within the page text
    pub text_range: Range<usize>,
    /// Lower bound of the span: the next span's anchor, or page bottom
    pub end_y: f32,
    /// False when the label sits on a marks-tally line; such spans
    /// still scope comments but never receive score text
    pub score_eligible: bool,
}

/// Locate every question span on a page, sorted by anchor y ascending.
/// Labels whose bounding box cannot be found contribute no span.
pub fn locate_question_spans<S: DocumentSurface>(
    surface: &S,
    page: usize,
) -> Result<Vec<QuestionSpan>> {
    let text = surface.page_text(page)?;
    let page_height = surface.page_size(page)?.height;

    let tokens = question_labels(&text);
    debug!(page = page + 1, count = tokens.len(), "question label tokens");

    let mut spans = Vec::new();
    for token in tokens {
        let rects = match surface.search(page, &token.label) {
            Ok(rects) => rects,
            Err(e) => {
                warn!(page = page + 1, label = %token.label, error = %e, "label search failed");
                continue;
            }
        };
        let Some(rect) = rects.first() else {
            warn!(
                page = page + 1,
                label = %token.label,
                "no bounding box found for label, dropping"
            );
            continue;
        };

        let score_eligible = !is_marks_tally(&text, &token.range);
        spans.push(QuestionSpan {
            label: token.label,
            y: rect.y0,
            rect: *rect,
            text_range: token.range,
            end_y: page_height,
            score_eligible,
        });
    }

    // Reading order by anchor, not token order: adjacency below depends
    // on it
    spans.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));

    let anchors: Vec<f32> = spans.iter().map(|s| s.y).collect();
    for (i, span) in spans.iter_mut().enumerate() {
        span.end_y = anchors.get(i + 1).copied().unwrap_or(page_height);
    }

    Ok(spans)
}

/// Does the label's own text line look like a marks tally?
fn is_marks_tally(text: &str, token_range: &Range<usize>) -> bool {
    let line_start = text[..token_range.start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = text[token_range.start..]
        .find('\n')
        .map(|i| token_range.start + i)
        .unwrap_or(text.len());
    let context = text[line_start..line_end].to_lowercase();

    SCORE_CONTEXT_STOPLIST
        .iter()
        .any(|word| context.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fake::FakeSurface;
    use pretty_assertions::assert_eq;

    #[test]
    fn spans_are_adjacent_top_to_bottom() {
        let surface = FakeSurface::single_page(&[
            (100.0, "1.1 Define equity"),
            (250.0, "1.2 Define liabilities"),
            (400.0, "1.3 Define assets"),
        ]);

        let spans = locate_question_spans(&surface, 0).unwrap();
        let extents: Vec<(f32, f32)> = spans.iter().map(|s| (s.y, s.end_y)).collect();
        assert_eq!(
            extents,
            vec![(100.0, 250.0), (250.0, 400.0), (400.0, 800.0)]
        );
    }

    #[test]
    fn marks_tally_lines_are_score_ineligible() {
        let surface = FakeSurface::single_page(&[(300.0, "2.1 / 5 marks")]);
        let spans = locate_question_spans(&surface, 0).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, "2.1");
        assert!(!spans[0].score_eligible);
    }

    #[test]
    fn plain_question_lines_are_score_eligible() {
        let surface = FakeSurface::single_page(&[(120.0, "3.2 Discuss the audit risk")]);
        let spans = locate_question_spans(&surface, 0).unwrap();
        assert!(spans[0].score_eligible);
    }

    #[test]
    fn labels_without_bounding_boxes_are_dropped() {
        // Page text mentions 4.1 but the label is not searchable on the
        // page surface
        let mut surface = FakeSurface::single_page(&[(100.0, "some other content")]);
        surface.pages[0].text_override = Some("4.1 Discuss going concern".to_string());

        let spans = locate_question_spans(&surface, 0).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn spans_sorted_by_anchor_even_when_text_order_differs() {
        // 5.2 appears earlier in the text stream but lower on the page
        let surface = FakeSurface::single_page(&[(400.0, "5.2 second part"), (100.0, "5.1 first part")]);
        let spans = locate_question_spans(&surface, 0).unwrap();
        let labels: Vec<&str> = spans.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["5.1", "5.2"]);
    }
}
