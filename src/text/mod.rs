//! Text normalization, label grammar, and answer segmentation

pub mod labels;
pub mod normalize;
pub mod segment;

pub use labels::{leading_label, question_labels, LabelToken};
pub use normalize::Normalizer;
pub use segment::{segment_answers, AnswerChunk};
