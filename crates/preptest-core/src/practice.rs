//! Untimed practice sets: free-text questions with worked solutions.
//!
//! The service answers in lightly formatted text. Each question starts with
//! a `**Question N:**` heading and its solution follows a
//! [`SOLUTION_MARKER`] line.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Separator between a question and its worked solution.
pub const SOLUTION_MARKER: &str = "[---SOLUTION---]";

const QUESTION_HEADING: &str = "**Question ";

/// Largest practice set one request may ask for.
pub const MAX_PRACTICE_QUESTIONS: usize = 20;

pub const DEFAULT_EXAM: &str = "JEE Main";

/// Input of the practice-set call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeRequest {
    pub subject: String,
    pub topic: String,
    /// Target exam, e.g. "JEE Advanced" or "NEET".
    pub exam: String,
    pub count: usize,
}

impl PracticeRequest {
    pub fn new(
        subject: impl Into<String>,
        topic: impl Into<String>,
        exam: impl Into<String>,
        count: usize,
    ) -> Self {
        Self {
            subject: subject.into().trim().to_string(),
            topic: topic.into().trim().to_string(),
            exam: exam.into().trim().to_string(),
            count,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.topic.is_empty() {
            return Err(EngineError::Validation("Please enter a topic.".into()));
        }
        if self.subject.is_empty() || self.exam.is_empty() {
            return Err(EngineError::Validation("subject and exam are required".into()));
        }
        if !(1..=MAX_PRACTICE_QUESTIONS).contains(&self.count) {
            return Err(EngineError::Validation(format!(
                "question count must be between 1 and {MAX_PRACTICE_QUESTIONS}, got {}",
                self.count
            )));
        }
        Ok(())
    }
}

/// One generated practice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    /// Number as written by the service.
    pub number: u32,
    /// Question text and options.
    pub body: String,
    /// Correct answer and worked solution, if the service gave one.
    pub solution: Option<String>,
}

/// Split a practice-set answer into questions.
///
/// Text before the first heading is ignored. Headings without a number are
/// numbered after the previous question.
pub fn parse_practice_set(text: &str) -> Result<Vec<PracticeQuestion>, EngineError> {
    let mut questions = Vec::new();

    for chunk in text.split(QUESTION_HEADING).skip(1) {
        let Some((label, rest)) = chunk.split_once(':') else {
            continue;
        };
        let number = label
            .trim()
            .parse()
            .unwrap_or_else(|_| questions.len() as u32 + 1);
        let rest = rest.strip_prefix("**").unwrap_or(rest);

        let (body, solution) = match rest.split_once(SOLUTION_MARKER) {
            Some((body, solution)) => (body, Some(solution.trim().to_string())),
            None => (rest, None),
        };
        let body = body.trim();
        if body.is_empty() {
            continue;
        }

        questions.push(PracticeQuestion {
            number,
            body: body.to_string(),
            solution: solution.filter(|s| !s.is_empty()),
        });
    }

    if questions.is_empty() {
        return Err(EngineError::MalformedResponse(
            "no \"**Question N:**\" headings in practice set".into(),
        ));
    }
    Ok(questions)
}
