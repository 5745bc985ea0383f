//! Annotation core: configuration, per-page passes, and the run driver
//!
//! A run is strictly sequential: per-page scoring and comments, then
//! per-page underlines, then one whole-document correct-lines pass
//! (line matches may carry forward across pages), then save. The only
//! shared mutable state is the document surface and the match cursor,
//! both owned by the single driving flow.

pub mod evidence;
pub mod layout;
pub mod span;

use crate::error::{Error, Result};
use crate::pdf::{create_pdfium, validate_pdf_header, Color, DocumentSurface, PdfiumSurface};
use crate::rubric::{GradeBook, ModelAnswerSet};
use evidence::{search_hits, MatchCursor};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Layout and matching parameters
///
/// Defaults reproduce the established visual layout for A4-ish pages;
/// every magic number is deliberately a field rather than a constant.
#[derive(Debug, Clone)]
pub struct AnnotationConfig {
    /// Score text size in points
    pub score_font_size: f32,
    pub score_color: Color,
    /// Horizontal offset of score text from the label's left edge
    pub score_x_offset: f32,
    /// Vertical offset of score text below the label's top edge
    pub score_y_offset: f32,

    /// Comment text size in points
    pub comment_font_size: f32,
    pub comment_color: Color,
    /// Maximum comment line width; the block is right-aligned to the
    /// page at this distance from the right edge
    pub comment_width: f32,
    /// Extra leading added to the font size per comment line
    pub comment_line_spacing: f32,
    /// Gap kept above the next question's anchor when clipping
    pub comment_bottom_margin: f32,

    /// Glyph drawn for a credited line
    pub tick_glyph: char,
    pub tick_font_size: f32,
    pub tick_color: Color,
    /// Distance the tick sits left of the line's first word
    pub tick_x_offset: f32,
    /// Leftmost x a tick may occupy
    pub tick_min_x: f32,
    /// Distance the tick sits below the line's top
    pub tick_y_offset: f32,

    pub underline_color: Color,
    pub underline_width: f32,
    /// Distance of the stroke below the occurrence's bottom edge
    pub underline_y_offset: f32,

    /// Characters of a correct line used as the search needle
    pub search_prefix_len: usize,
    /// Distinct word hits required by the fallback matching tier
    pub fallback_word_threshold: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            score_font_size: 12.0,
            score_color: Color::BLUE,
            score_x_offset: -40.0,
            score_y_offset: 10.0,
            comment_font_size: 8.0,
            comment_color: Color::RED,
            comment_width: 90.0,
            comment_line_spacing: 2.0,
            comment_bottom_margin: 5.0,
            tick_glyph: '\u{2714}',
            tick_font_size: 12.0,
            tick_color: Color::BLACK,
            tick_x_offset: 25.0,
            tick_min_x: 10.0,
            tick_y_offset: 10.0,
            underline_color: Color::RED,
            underline_width: 1.5,
            underline_y_offset: 2.0,
            search_prefix_len: 50,
            fallback_word_threshold: 4,
        }
    }
}

/// Aggregated outcome counters for one run. Individual failures are
/// logged with context and counted here; none of them aborts the run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotationReport {
    pub scores_placed: usize,
    pub comments_placed: usize,
    pub comments_truncated: usize,
    pub underlines_drawn: usize,
    pub lines_matched: usize,
    pub lines_unmatched: usize,
    pub ticks_placed: usize,
    pub draw_failures: usize,
}

/// Result of a completed annotation run
#[derive(Debug, Clone)]
pub struct AnnotationOutcome {
    pub output_path: PathBuf,
    pub report: AnnotationReport,
}

/// Drive every annotation pass over an open document
pub fn annotate_document<S: DocumentSurface>(
    surface: &mut S,
    grades: &GradeBook,
    config: &AnnotationConfig,
) -> Result<AnnotationReport> {
    let score_labels = grades.score_labels();
    let comment_labels = grades.comment_labels();
    let word_groups = grades.correct_word_groups();
    let correct_lines = grades.correct_lines();

    info!(
        scores = score_labels.len(),
        comments = comment_labels.len(),
        lines = correct_lines.len(),
        word_groups = word_groups.len(),
        "annotation lookup tables built"
    );

    let mut report = AnnotationReport::default();

    for page in 0..surface.page_count() {
        info!(page = page + 1, "processing page");

        let spans = span::locate_question_spans(surface, page)?;

        let mut scored: HashSet<String> = HashSet::new();
        let mut commented: HashSet<String> = HashSet::new();

        for question in &spans {
            if !question.score_eligible {
                info!(label = %question.label, "label sits on a marks tally line, skipping score");
            } else if let Some(score) = score_labels.get(&question.label) {
                if scored.insert(question.label.clone()) {
                    match layout::place_score(surface, page, &question.rect, score, config) {
                        Ok(()) => {
                            info!(page = page + 1, label = %question.label, score = %score, "score placed");
                            report.scores_placed += 1;
                        }
                        Err(e) => {
                            error!(page = page + 1, label = %question.label, error = %e, "score placement failed");
                            report.draw_failures += 1;
                        }
                    }
                }
            } else {
                debug!(label = %question.label, "no grade registered for label");
            }

            if let Some(comment) = comment_labels.get(&question.label) {
                if commented.insert(question.label.clone()) {
                    let y_limit = question.end_y - config.comment_bottom_margin;
                    match layout::place_comment(surface, page, question.y, y_limit, comment, config)
                    {
                        Ok(placement) => {
                            report.comments_placed += 1;
                            if placement.truncated {
                                report.comments_truncated += 1;
                            }
                        }
                        Err(e) => {
                            error!(page = page + 1, label = %question.label, error = %e, "comment placement failed");
                            report.draw_failures += 1;
                        }
                    }
                }
            }
        }

        underline_correct_words(surface, page, &word_groups, config, &mut report);
    }

    // Line matches may span forward across pages, so this pass runs
    // once over the whole document with a single cursor
    let mut cursor = MatchCursor::default();
    evidence::annotate_correct_lines(surface, &correct_lines, &mut cursor, config, &mut report)?;

    Ok(report)
}

/// Underline every verbatim occurrence of every configured phrase on a
/// page. Unlike ticks, underlines are not position-deduplicated:
/// distinct phrases may legitimately underline on the same line.
fn underline_correct_words<S: DocumentSurface>(
    surface: &mut S,
    page: usize,
    word_groups: &[Vec<String>],
    config: &AnnotationConfig,
    report: &mut AnnotationReport,
) {
    for group in word_groups {
        for phrase in group {
            let needle = phrase.trim();
            if needle.is_empty() {
                continue;
            }

            let occurrences = search_hits(surface, page, needle);
            if occurrences.is_empty() {
                debug!(page = page + 1, phrase = %needle, "no occurrence to underline");
                continue;
            }

            info!(page = page + 1, phrase = %needle, count = occurrences.len(), "underlining phrase");
            for rect in occurrences {
                match layout::underline_occurrence(surface, page, &rect, config) {
                    Ok(()) => report.underlines_drawn += 1,
                    Err(e) => {
                        error!(page = page + 1, phrase = %needle, error = %e, "underline failed");
                        report.draw_failures += 1;
                    }
                }
            }
        }
    }
}

/// Annotate one student's script end to end: validate inputs, open the
/// PDF, run every pass, and save to
/// `<output_dir>/<student>/<student>_annotated.pdf` (student name
/// lower-cased). Returns the output path and the run's counters.
pub fn annotate_pdf(
    input_pdf: &Path,
    grades_csv: &Path,
    student_name: &str,
    output_dir: &Path,
    model_answers: Option<&Path>,
    config: &AnnotationConfig,
) -> Result<AnnotationOutcome> {
    info!(input = %input_pdf.display(), student = %student_name, "starting annotation run");

    if !input_pdf.exists() {
        return Err(Error::PdfNotFound {
            path: input_pdf.display().to_string(),
        });
    }

    let mut grades = GradeBook::from_csv_path(grades_csv)?;
    if let Some(path) = model_answers {
        let answers = ModelAnswerSet::load(path)?;
        grades.fill_missing(&answers.mark_allocations());
    }

    let data = std::fs::read(input_pdf)?;
    validate_pdf_header(&data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(&data, None)
        .map_err(crate::pdf::pdfium::map_pdfium_error)?;
    let mut surface = PdfiumSurface::new(document)?;
    info!(pages = surface.page_count(), "PDF opened");

    let report = annotate_document(&mut surface, &grades, config)?;

    let student_lower = student_name.to_lowercase();
    let output_path = output_dir
        .join(&student_lower)
        .join(format!("{}_annotated.pdf", student_lower));
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write to a scratch name first so a failed save never leaves a
    // partial file at the final path
    let scratch_path = output_path.with_extension("pdf.part");
    surface.save(&scratch_path)?;
    std::fs::rename(&scratch_path, &output_path).map_err(|e| Error::Save {
        path: output_path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(output = %output_path.display(), "annotation run complete");
    Ok(AnnotationOutcome {
        output_path,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fake::{DrawOp, FakePage, FakeSurface};
    use crate::rubric::GradeRecord;
    use pretty_assertions::assert_eq;

    fn record(
        question: &str,
        score: &str,
        total: &str,
        comment: &str,
        lines: Option<&str>,
        words: Option<&str>,
    ) -> GradeRecord {
        GradeRecord {
            student_id: None,
            question_number: question.to_string(),
            score: score.to_string(),
            total_marks: total.to_string(),
            comment: if comment.is_empty() {
                None
            } else {
                Some(comment.to_string())
            },
            correct_lines: lines.map(String::from),
            correct_words: words.map(String::from),
            student_answer_snippet: None,
        }
    }

    fn text_ops(surface: &FakeSurface) -> Vec<(usize, String)> {
        surface
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page, text, .. } => Some((*page, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_run_places_every_ink_kind() {
        let mut surface = FakeSurface::new(vec![
            FakePage::new(&[
                (100.0, "2.1 Define the term equity"),
                (150.0, "Equity is the residual interest in assets"),
                (400.0, "2.2 Why does it matter"),
                (450.0, "It informs capital allocation decisions"),
            ]),
            FakePage::new(&[(100.0, "continued discussion of allocation")]),
        ]);

        let grades = GradeBook::new(vec![
            record(
                "2.1",
                "3",
                "5",
                "Good definition",
                Some("['Equity is the residual interest in assets']"),
                Some("['residual interest']"),
            ),
            record("2.2", "2", "4", "", None, None),
        ]);

        let report = annotate_document(&mut surface, &grades, &AnnotationConfig::default()).unwrap();

        assert_eq!(report.scores_placed, 2);
        assert_eq!(report.comments_placed, 1);
        assert_eq!(report.underlines_drawn, 1);
        assert_eq!(report.ticks_placed, 1);
        assert_eq!(report.lines_unmatched, 0);
        assert_eq!(report.draw_failures, 0);

        let texts = text_ops(&surface);
        assert!(texts.iter().any(|(_, t)| t == "3/5"));
        assert!(texts.iter().any(|(_, t)| t == "2/4"));
        assert!(texts.iter().any(|(_, t)| t == "\u{2714}"));
    }

    #[test]
    fn marks_tally_label_gets_comment_but_no_score() {
        let mut surface =
            FakeSurface::single_page(&[(300.0, "2.1 / 5 marks"), (500.0, "unrelated content")]);

        let grades = GradeBook::new(vec![record(
            "2.1",
            "4",
            "5",
            "Nearly complete answer",
            None,
            None,
        )]);

        let report = annotate_document(&mut surface, &grades, &AnnotationConfig::default()).unwrap();

        assert_eq!(report.scores_placed, 0);
        assert_eq!(report.comments_placed, 1);

        let texts = text_ops(&surface);
        assert!(!texts.iter().any(|(_, t)| t == "4/5"));
        assert!(texts.iter().any(|(_, t)| t.contains("Nearly")));
    }

    #[test]
    fn repeated_label_on_page_is_annotated_once() {
        let mut surface = FakeSurface::single_page(&[
            (100.0, "3.1 First mention of the part"),
            (400.0, "3.1 repeated lower on the page"),
        ]);

        let grades = GradeBook::new(vec![record("3.1", "5", "5", "", None, None)]);
        let report = annotate_document(&mut surface, &grades, &AnnotationConfig::default()).unwrap();

        assert_eq!(report.scores_placed, 1);
    }

    #[test]
    fn underlines_every_occurrence_on_the_page() {
        let mut surface = FakeSurface::single_page(&[
            (100.0, "working capital drives working capital cycles"),
        ]);

        let grades = GradeBook::new(vec![record(
            "1.1",
            "1",
            "2",
            "",
            None,
            Some("['working capital']"),
        )]);
        let report = annotate_document(&mut surface, &grades, &AnnotationConfig::default()).unwrap();

        assert_eq!(report.underlines_drawn, 2);
        assert_eq!(surface.lines_drawn().len(), 2);
    }

    #[test]
    fn unmatched_lines_are_skipped_not_fatal() {
        let mut surface = FakeSurface::single_page(&[(100.0, "1.1 some answer text")]);

        let grades = GradeBook::new(vec![record(
            "1.1",
            "2",
            "2",
            "",
            Some("['phrase that appears nowhere in the document']"),
            None,
        )]);

        let report = annotate_document(&mut surface, &grades, &AnnotationConfig::default()).unwrap();
        assert_eq!(report.lines_unmatched, 1);
        assert_eq!(report.ticks_placed, 0);
    }
}
