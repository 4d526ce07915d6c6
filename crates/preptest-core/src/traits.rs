//! The question service contract.
//!
//! Implemented by the `preptest-providers` crate (Gemini, mock). The engine
//! only ever sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Question, TestSetup};
use crate::practice::PracticeRequest;
use crate::scoring::{PerformanceRecord, ScoreSummary};
use crate::session::Session;

/// A remote generator of questions and feedback.
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Human-readable service name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate exactly `request.count` questions.
    ///
    /// Malformed or short answers must be reported as errors, not padded.
    async fn generate_questions(&self, request: &QuestionRequest) -> anyhow::Result<Vec<Question>>;

    /// Produce free-form HTML feedback for a finished session.
    async fn generate_feedback(&self, request: &FeedbackRequest) -> anyhow::Result<String>;

    /// Produce a practice set as text, one `**Question N:**` block per
    /// question. Parsed by [`crate::practice::parse_practice_set`].
    async fn generate_practice(&self, _request: &PracticeRequest) -> anyhow::Result<String> {
        anyhow::bail!("{} does not generate practice sets", self.name())
    }
}

/// Input of the question-generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub count: usize,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
}

impl QuestionRequest {
    pub fn for_setup(setup: &TestSetup) -> Self {
        Self {
            count: setup.question_count(),
            subject: setup.subject.trim().to_string(),
            topic: setup.topic.trim().to_string(),
            difficulty: setup.difficulty,
        }
    }
}

/// Input of the feedback call: the score plus the full breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub topic: String,
    pub subject: String,
    pub score: i32,
    pub total_marks: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub per_question: Vec<PerformanceRecord>,
}

impl FeedbackRequest {
    pub fn for_session(session: &Session, summary: &ScoreSummary) -> Self {
        let setup = session.setup();
        Self {
            topic: setup.topic.trim().to_string(),
            subject: setup.subject.trim().to_string(),
            score: summary.score,
            total_marks: summary.total_marks,
            correct_count: summary.correct_count,
            incorrect_count: summary.incorrect_count,
            per_question: crate::scoring::performance_records(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;
    use crate::scoring::score_session;
    use crate::session::tests::make_session;

    #[test]
    fn question_request_from_setup() {
        let setup = TestSetup::new(" Chemistry ", " Mole concept ", Difficulty::Hard, 10);
        let request = QuestionRequest::for_setup(&setup);
        assert_eq!(request.count, 4);
        assert_eq!(request.subject, "Chemistry");
        assert_eq!(request.topic, "Mole concept");
        assert_eq!(request.difficulty, Difficulty::Hard);
    }

    #[test]
    fn feedback_request_carries_breakdown() {
        let mut session = make_session(&[Choice::A, Choice::B, Choice::C]);
        session.select_option(Choice::A);
        session.go_next();
        session.select_option(Choice::D);

        let summary = score_session(&session);
        let request = FeedbackRequest::for_session(&session, &summary);
        assert_eq!(request.score, 3);
        assert_eq!(request.total_marks, 12);
        assert_eq!(request.correct_count, 1);
        assert_eq!(request.incorrect_count, 1);
        assert_eq!(request.per_question.len(), 3);
        assert_eq!(request.topic, "Kinematics");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["perQuestion"][2]["userAnswer"], "Not Answered");
        assert_eq!(json["totalMarks"], 12);
    }
}
