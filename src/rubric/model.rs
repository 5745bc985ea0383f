//! Question / model-answer JSON contract
//!
//! Shape of the structured extraction the LLM collaborator produces:
//! one set per main question, with recursively nested sub-answers.
//! Marks fields are freeform numeric-looking strings and are passed
//! through untouched.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A (sub)question's model answer, possibly subdivided further
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelAnswer {
    pub question_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marking_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_marks_available: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_marks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_answers: Option<Vec<ModelAnswer>>,
}

/// The extraction for one main question
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelAnswerSet {
    pub question_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub answers: Vec<ModelAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<String>,
}

impl ModelAnswerSet {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// (question_number, maximum_marks) for every leaf answer, in
    /// document order; missing marks default to "0"
    pub fn mark_allocations(&self) -> Vec<(String, String)> {
        let mut allocations = Vec::new();
        for answer in &self.answers {
            collect_allocations(answer, &mut allocations);
        }
        allocations
    }
}

fn collect_allocations(answer: &ModelAnswer, out: &mut Vec<(String, String)>) {
    match answer.sub_answers.as_deref() {
        Some(children) if !children.is_empty() => {
            for child in children {
                collect_allocations(child, out);
            }
        }
        _ => out.push((
            answer.question_number.clone(),
            answer
                .maximum_marks
                .clone()
                .unwrap_or_else(|| "0".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn allocations_flatten_to_leaves() {
        let set: ModelAnswerSet = serde_json::from_str(
            r#"{
                "question_title": "Question 1",
                "answers": [
                    {
                        "question_number": "1.1",
                        "maximum_marks": "4",
                        "sub_answers": [
                            {"question_number": "1.1(a)", "maximum_marks": "2"},
                            {"question_number": "1.1(b)"}
                        ]
                    },
                    {"question_number": "1.2", "maximum_marks": "6"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            set.mark_allocations(),
            vec![
                ("1.1(a)".to_string(), "2".to_string()),
                ("1.1(b)".to_string(), "0".to_string()),
                ("1.2".to_string(), "6".to_string()),
            ]
        );
    }
}
