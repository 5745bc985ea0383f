//! Grades table ingestion
//!
//! One CSV row per graded question, produced by the grading
//! collaborator. The table is read-only input here; lookup tables and
//! the flattened evidence lists are derived once and drive the
//! annotation passes.

use crate::error::{Error, Result};
use crate::rubric::cell::parse_list_cell;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One graded question as emitted by the grading collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct GradeRecord {
    #[serde(default)]
    pub student_id: Option<String>,
    pub question_number: String,
    pub score: String,
    pub total_marks: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// List-encoded lines quoted verbatim from the student's answer
    #[serde(default)]
    pub correct_lines: Option<String>,
    /// List-encoded short phrases from within the correct lines
    #[serde(default)]
    pub correct_words: Option<String>,
    #[serde(default)]
    pub student_answer_snippet: Option<String>,
}

/// The full grades table plus derived lookups
#[derive(Debug, Clone)]
pub struct GradeBook {
    records: Vec<GradeRecord>,
}

impl GradeBook {
    pub fn new(records: Vec<GradeRecord>) -> Self {
        Self { records }
    }

    /// Load a grades CSV; missing or empty tables are fatal to a run
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::RubricNotFound {
                path: path.display().to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: GradeRecord = row?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(Error::EmptyRubric {
                path: path.display().to_string(),
            });
        }

        info!(rows = records.len(), path = %path.display(), "loaded grades table");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[GradeRecord] {
        &self.records
    }

    /// `label -> "score/total"`; on duplicate labels the last row wins
    pub fn score_labels(&self) -> HashMap<String, String> {
        self.records
            .iter()
            .map(|r| {
                (
                    r.question_number.trim().to_string(),
                    format!("{}/{}", r.score.trim(), r.total_marks.trim()),
                )
            })
            .collect()
    }

    /// `label -> comment`, non-empty comments only; last row wins
    pub fn comment_labels(&self) -> HashMap<String, String> {
        self.records
            .iter()
            .filter_map(|r| {
                let comment = r.comment.as_deref().unwrap_or("").trim();
                if comment.is_empty() {
                    None
                } else {
                    Some((r.question_number.trim().to_string(), comment.to_string()))
                }
            })
            .collect()
    }

    /// Every correct line across all rows, flattened into one ordered
    /// list of trimmed, non-empty entries. Unparseable cells contribute
    /// themselves as a single literal line.
    pub fn correct_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.correct_lines.as_deref())
            .filter(|cell| !cell.trim().is_empty())
            .flat_map(|cell| parse_list_cell(cell).entries())
            .collect()
    }

    /// Correct-word phrase groups, one per row that has any
    pub fn correct_word_groups(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .filter_map(|r| r.correct_words.as_deref())
            .filter(|cell| !cell.trim().is_empty())
            .map(|cell| parse_list_cell(cell).entries())
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// Append zero-score rows for questions the grader never covered,
    /// so every allocated question still receives a score and comment
    pub fn fill_missing(&mut self, allocations: &[(String, String)]) {
        let graded: std::collections::HashSet<String> = self
            .records
            .iter()
            .map(|r| r.question_number.trim().to_string())
            .collect();

        for (question_number, maximum_marks) in allocations {
            if graded.contains(question_number.trim()) {
                continue;
            }
            info!(question = %question_number, "no grade row, filling with zero score");
            self.records.push(GradeRecord {
                student_id: None,
                question_number: question_number.clone(),
                score: "0".to_string(),
                total_marks: maximum_marks.clone(),
                comment: Some("No answer provided".to_string()),
                correct_lines: None,
                correct_words: None,
                student_answer_snippet: None,
            });
        }
    }
}
