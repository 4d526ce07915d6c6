//! Session state for one mock-test attempt.
//!
//! A [`Session`] owns the question list, one answer slot per question, and
//! the index of the question on screen. All mutation goes through methods
//! that keep `answers.len() == questions.len()` and the index in range.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Choice, Question, TestSetup};

/// Which navigation controls the active screen should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    /// "Previous" is enabled (false on the first question).
    pub prev_enabled: bool,
    /// "Next" is shown (false on the last question).
    pub next_visible: bool,
    /// "Submit" is shown (true on the last question only).
    pub submit_visible: bool,
}

/// The complete state of one in-progress or completed quiz attempt.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    setup: TestSetup,
    questions: Vec<Question>,
    answers: Vec<Option<Choice>>,
    current: usize,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from freshly generated questions.
    ///
    /// Fails with [`EngineError::NoContent`] when the list is empty: the
    /// current index must always point at a question.
    pub fn new(setup: TestSetup, questions: Vec<Question>) -> Result<Self, EngineError> {
        if questions.is_empty() {
            return Err(EngineError::NoContent(
                "question service returned no questions".into(),
            ));
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            id: Uuid::new_v4(),
            setup,
            questions,
            answers,
            current: 0,
            started_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn setup(&self) -> &TestSetup {
        &self.setup
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<Choice>] {
        &self.answers
    }

    /// Number of questions (N).
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; a session holds at least one question.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> Option<Choice> {
        self.answers[self.current]
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    /// Record `choice` for the current question.
    ///
    /// Returns whether the stored answer changed; selecting the same letter
    /// again leaves the session as it was.
    pub fn select_option(&mut self, choice: Choice) -> bool {
        let slot = &mut self.answers[self.current];
        let changed = *slot != Some(choice);
        *slot = Some(choice);
        changed
    }

    /// Move to the next question. No-op on the last one.
    pub fn go_next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Move to the previous question. No-op on the first one.
    pub fn go_prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn nav_state(&self) -> NavState {
        let last = self.is_last();
        NavState {
            prev_enabled: !self.is_first(),
            next_visible: !last,
            submit_visible: last,
        }
    }
}
