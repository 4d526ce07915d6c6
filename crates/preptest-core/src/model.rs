//! Core data model types for preptest.
//!
//! Questions as received from the question service, the answer letters,
//! difficulty levels, and the setup form that starts a session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Shortest test the setup form accepts, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;

/// Longest test accepted: a full three-hour paper.
pub const MAX_DURATION_MINUTES: u32 = 180;

/// Number of options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One of the four answer letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    /// All letters in display order.
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// Zero-based option position of this letter.
    pub fn index(self) -> usize {
        match self {
            Choice::A => 0,
            Choice::B => 1,
            Choice::C => 2,
            Choice::D => 3,
        }
    }

    /// Interpret a single character as a letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Choice> {
        match c.to_ascii_uppercase() {
            'A' => Some(Choice::A),
            'B' => Some(Choice::B),
            'C' => Some(Choice::C),
            'D' => Some(Choice::D),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
        };
        f.write_str(letter)
    }
}

impl FromStr for Choice {
    type Err = String;

    /// Accepts `"B"`, `"b"`, `"B)"` and `"B. text"`: the first non-space
    /// character decides, and it must not be followed by another letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let first = chars
            .next()
            .ok_or_else(|| "empty answer letter".to_string())?;
        if chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(format!("unknown answer letter: {trimmed}"));
        }
        Choice::from_char(first).ok_or_else(|| format!("unknown answer letter: {trimmed}"))
    }
}

impl TryFrom<String> for Choice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        choice.to_string()
    }
}

/// Difficulty level requested from the question service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A multiple-choice question as produced by the question service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Subject the question belongs to (e.g. "Physics").
    pub subject: String,
    /// The question text.
    pub question: String,
    /// Four options, each prefixed with its letter ("A) ...").
    pub options: Vec<String>,
    /// Letter of the correct option.
    pub correct_answer: Choice,
}

impl Question {
    /// The options paired with the letter that selects them.
    ///
    /// Letters follow position, whatever the option text starts with, so
    /// the view, the stored answer and the report always agree.
    pub fn lettered_options(&self) -> impl Iterator<Item = (Choice, &str)> + '_ {
        Choice::ALL
            .into_iter()
            .zip(self.options.iter().map(String::as_str))
    }

    /// Check the shape the session engine relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".into());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {OPTIONS_PER_QUESTION} options, got {}",
                self.options.len()
            ));
        }
        Ok(())
    }
}

/// The values submitted from the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSetup {
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
}

impl TestSetup {
    pub fn new(
        subject: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
        duration_minutes: u32,
    ) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
            difficulty,
            duration_minutes,
        }
    }

    /// Validate the form: subject and topic present, duration in range.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.subject.trim().is_empty() {
            return Err(EngineError::Validation("subject is empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(EngineError::Validation("topic is empty".into()));
        }
        if self.duration_minutes < MIN_DURATION_MINUTES {
            return Err(EngineError::Validation(format!(
                "duration must be at least {MIN_DURATION_MINUTES} minutes, got {}",
                self.duration_minutes
            )));
        }
        if self.duration_minutes > MAX_DURATION_MINUTES {
            return Err(EngineError::Validation(format!(
                "duration must be at most {MAX_DURATION_MINUTES} minutes, got {}",
                self.duration_minutes
            )));
        }
        Ok(())
    }

    /// Number of questions to request for this duration.
    pub fn question_count(&self) -> usize {
        question_count(self.duration_minutes)
    }

    /// Length of the countdown in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }
}

/// `max(1, floor(minutes / 2.4))`, computed in integers as `5m / 12`.
pub fn question_count(duration_minutes: u32) -> usize {
    let count = (u64::from(duration_minutes) * 5 / 12) as usize;
    count.max(1)
}
