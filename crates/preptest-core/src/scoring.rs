//! Marking scheme and score summaries.
//!
//! JEE-style marking: +4 for a correct answer, -1 for a wrong one, 0 for a
//! question left unanswered.

use serde::{Deserialize, Serialize, Serializer};

use crate::model::{Choice, Question};
use crate::session::Session;

pub const MARKS_CORRECT: i32 = 4;
pub const PENALTY_INCORRECT: i32 = 1;

/// Label sent to the feedback service for a skipped question.
pub const NOT_ANSWERED: &str = "Not Answered";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

impl Verdict {
    pub fn judge(answer: Option<Choice>, correct: Choice) -> Self {
        match answer {
            Some(a) if a == correct => Verdict::Correct,
            Some(_) => Verdict::Incorrect,
            None => Verdict::Unanswered,
        }
    }

    pub fn marks(self) -> i32 {
        match self {
            Verdict::Correct => MARKS_CORRECT,
            Verdict::Incorrect => -PENALTY_INCORRECT,
            Verdict::Unanswered => 0,
        }
    }
}

/// Result of marking a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub score: i32,
    pub total_marks: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
}

impl ScoreSummary {
    /// `"score / totalMarks"`, as shown on the results screen.
    pub fn display(&self) -> String {
        format!("{} / {}", self.score, self.total_marks)
    }
}

/// Mark parallel slices of questions and answers.
pub fn score_answers(questions: &[Question], answers: &[Option<Choice>]) -> ScoreSummary {
    let mut summary = ScoreSummary {
        score: 0,
        total_marks: questions.len() as u32 * MARKS_CORRECT as u32,
        correct_count: 0,
        incorrect_count: 0,
        unanswered_count: 0,
    };

    for (question, answer) in questions.iter().zip(answers) {
        let verdict = Verdict::judge(*answer, question.correct_answer);
        summary.score += verdict.marks();
        match verdict {
            Verdict::Correct => summary.correct_count += 1,
            Verdict::Incorrect => summary.incorrect_count += 1,
            Verdict::Unanswered => summary.unanswered_count += 1,
        }
    }

    summary
}

pub fn score_session(session: &Session) -> ScoreSummary {
    score_answers(session.questions(), session.answers())
}

/// One row of the breakdown sent with the feedback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub question: String,
    #[serde(serialize_with = "serialize_user_answer")]
    pub user_answer: Option<Choice>,
    pub correct_answer: Choice,
}

fn serialize_user_answer<S: Serializer>(
    answer: &Option<Choice>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match answer {
        Some(choice) => serializer.serialize_str(&choice.to_string()),
        None => serializer.serialize_str(NOT_ANSWERED),
    }
}

pub fn performance_records(session: &Session) -> Vec<PerformanceRecord> {
    session
        .questions()
        .iter()
        .zip(session.answers())
        .map(|(q, a)| PerformanceRecord {
            question: q.question.clone(),
            user_answer: *a,
            correct_answer: q.correct_answer,
        })
        .collect()
}
