//! Mock question service for testing and offline practice.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use preptest_core::model::{Choice, Question};
use preptest_core::practice::{PracticeRequest, SOLUTION_MARKER};
use preptest_core::traits::{FeedbackRequest, QuestionRequest, QuestionService};

/// A question service that never touches the network.
///
/// By default it generates `count` deterministic questions whose correct
/// answers cycle A, B, C, D, and returns a short feedback paragraph.
pub struct MockService {
    /// Fixed question bank; generated questions are used when `None`.
    questions: Option<Vec<Question>>,
    /// Feedback HTML; `None` makes feedback requests fail.
    feedback: Option<String>,
    /// Whether question requests fail.
    fail_questions: bool,
    /// Simulated network latency.
    latency: Duration,
    question_calls: AtomicU32,
    feedback_calls: AtomicU32,
    last_question_request: Mutex<Option<QuestionRequest>>,
    last_feedback_request: Mutex<Option<FeedbackRequest>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            questions: None,
            feedback: Some(DEFAULT_FEEDBACK.to_string()),
            fail_questions: false,
            latency: Duration::ZERO,
            question_calls: AtomicU32::new(0),
            feedback_calls: AtomicU32::new(0),
            last_question_request: Mutex::new(None),
            last_feedback_request: Mutex::new(None),
        }
    }

    /// Serve the given questions (truncated to the requested count).
    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_feedback(mut self, feedback: &str) -> Self {
        self.feedback = Some(feedback.to_string());
        self
    }

    pub fn with_failing_feedback(mut self) -> Self {
        self.feedback = None;
        self
    }

    pub fn with_failing_questions(mut self) -> Self {
        self.fail_questions = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn question_calls(&self) -> u32 {
        self.question_calls.load(Ordering::Relaxed)
    }

    pub fn feedback_calls(&self) -> u32 {
        self.feedback_calls.load(Ordering::Relaxed)
    }

    pub fn last_question_request(&self) -> Option<QuestionRequest> {
        self.last_question_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    pub fn last_feedback_request(&self) -> Option<FeedbackRequest> {
        self.last_feedback_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

const DEFAULT_FEEDBACK: &str = "<h3>Overall summary</h3><p>Practice feedback generated offline.</p>";

/// Deterministic practice set in the `**Question N:**` layout.
pub fn sample_practice_set(request: &PracticeRequest) -> String {
    (1..=request.count)
        .map(|n| {
            let correct = Choice::ALL[(n - 1) % 4];
            format!(
                "**Question {n}:** {topic} practice problem {n} ({exam}).\n\
                 (A) first (B) second (C) third (D) fourth\n\
                 {SOLUTION_MARKER}\n\
                 **Correct Answer:** ({correct})\n\
                 **Step-by-Step Solution:** Worked offline for {subject}.\n",
                topic = request.topic,
                exam = request.exam,
                subject = request.subject,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic question `n` (1-based) for a request.
pub fn sample_question(request: &QuestionRequest, n: usize) -> Question {
    let correct = Choice::ALL[(n - 1) % 4];
    Question {
        subject: request.subject.clone(),
        question: format!("{} practice question {n} ({})", request.topic, request.difficulty),
        options: Choice::ALL
            .iter()
            .map(|c| format!("{c}) {} option {n}{}", request.topic, c.to_string().to_lowercase()))
            .collect(),
        correct_answer: correct,
    }
}

#[async_trait]
impl QuestionService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_questions(&self, request: &QuestionRequest) -> anyhow::Result<Vec<Question>> {
        self.question_calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_question_request.lock() {
            *last = Some(request.clone());
        }
        self.simulate_latency().await;

        if self.fail_questions {
            anyhow::bail!("mock question service failure");
        }

        let questions = match &self.questions {
            Some(bank) => bank.iter().take(request.count).cloned().collect(),
            None => (1..=request.count)
                .map(|n| sample_question(request, n))
                .collect(),
        };
        Ok(questions)
    }

    async fn generate_feedback(&self, request: &FeedbackRequest) -> anyhow::Result<String> {
        self.feedback_calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_feedback_request.lock() {
            *last = Some(request.clone());
        }
        self.simulate_latency().await;

        self.feedback
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mock feedback service failure"))
    }

    async fn generate_practice(&self, request: &PracticeRequest) -> anyhow::Result<String> {
        self.question_calls.fetch_add(1, Ordering::Relaxed);
        self.simulate_latency().await;

        if self.fail_questions {
            anyhow::bail!("mock question service failure");
        }
        Ok(sample_practice_set(request))
    }
}
