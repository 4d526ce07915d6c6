//! Test report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::FeedbackOutcome;
use crate::model::{Choice, TestSetup};
use crate::scoring::{ScoreSummary, Verdict};
use crate::session::Session;

/// A finished attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Session identifier.
    pub id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The setup form that started the session.
    pub setup: TestSetup,
    /// Marks and counts.
    pub summary: ScoreSummary,
    /// Seconds the clock ran before the session ended.
    pub elapsed_secs: u32,
    /// Per-question outcome, in question order.
    pub outcomes: Vec<QuestionOutcome>,
    /// Feedback, if it was requested.
    #[serde(default)]
    pub feedback: Option<FeedbackOutcome>,
}

/// How one question went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: Option<Choice>,
    pub correct_answer: Choice,
    pub verdict: Verdict,
    pub marks: i32,
}

impl TestReport {
    pub fn from_session(
        session: &Session,
        summary: ScoreSummary,
        elapsed_secs: u32,
        feedback: Option<FeedbackOutcome>,
    ) -> Self {
        let outcomes = session
            .questions()
            .iter()
            .zip(session.answers())
            .map(|(q, answer)| {
                let verdict = Verdict::judge(*answer, q.correct_answer);
                QuestionOutcome {
                    question: q.question.clone(),
                    options: q.options.clone(),
                    user_answer: *answer,
                    correct_answer: q.correct_answer,
                    verdict,
                    marks: verdict.marks(),
                }
            })
            .collect();

        Self {
            id: session.id(),
            started_at: session.started_at(),
            created_at: Utc::now(),
            setup: session.setup().clone(),
            summary,
            elapsed_secs,
            outcomes,
            feedback,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: TestReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
