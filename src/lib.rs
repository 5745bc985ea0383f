//! Exam Script Annotation Engine
//!
//! Takes the grading collaborator's output (a grades table and,
//! optionally, the model-answer JSON) and writes it back onto the
//! student's PDF:
//! - scores beside each question label
//! - word-wrapped comments in each question's margin band
//! - tick glyphs beside lines credited as correct
//! - underlines beneath correct key phrases
//!
//! The hard part is localization: question labels and graded evidence
//! must be found back in the PDF's page/coordinate space even though
//! the grader's text, the extracted page text, and the PDF's glyph
//! boxes disagree on whitespace and line breaks. See [`annotate`] for
//! the tiered matching strategy.

pub mod annotate;
pub mod error;
pub mod pdf;
pub mod rubric;
pub mod text;

pub use annotate::{
    annotate_document, annotate_pdf, AnnotationConfig, AnnotationOutcome, AnnotationReport,
};
pub use error::{Error, Result};
