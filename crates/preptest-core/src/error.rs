//! Engine error types.
//!
//! Every failure the session engine can report falls into one of four
//! user-visible classes (configuration, validation, service, no-content)
//! or is a misuse of the engine API by the front end.

use thiserror::Error;

use crate::screen::Screen;

/// Alert shown when the setup form is incomplete.
pub const VALIDATION_ALERT: &str =
    "Please fill in all fields and set a duration of at least 5 minutes.";

/// Alert shown when the question service fails during session start.
pub const GENERATION_ALERT: &str =
    "Failed to generate the test. Please check the topic and try again.";

/// Alert shown when the API key cannot be resolved.
pub const CONFIGURATION_ALERT: &str =
    "Failed to load API configuration. Please check your configuration and try again.";

/// Errors produced by the session engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The API key is missing or still set to the placeholder value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The setup form failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote service failed (network, HTTP status, transport).
    #[error("service error: {0}")]
    Service(String),

    /// The remote service answered but produced no usable content.
    #[error("no content: {0}")]
    NoContent(String),

    /// The remote service produced content that does not match the
    /// question schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A screen transition that the flow does not allow.
    #[error("invalid screen transition: {from} -> {to}")]
    InvalidTransition { from: Screen, to: Screen },

    /// An operation that needs an active session was called without one.
    #[error("no active session")]
    NoActiveSession,

    /// Feedback was requested before the session was submitted.
    #[error("session has not been submitted")]
    NotSubmitted,
}

impl EngineError {
    /// Returns `true` for failures of the remote service, including
    /// empty and malformed answers.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            EngineError::Service(_) | EngineError::NoContent(_) | EngineError::MalformedResponse(_)
        )
    }

    /// The message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Configuration(_) => CONFIGURATION_ALERT.to_string(),
            EngineError::Validation(_) => VALIDATION_ALERT.to_string(),
            e if e.is_service_failure() => GENERATION_ALERT.to_string(),
            other => other.to_string(),
        }
    }

    /// Classify an error returned by a [`QuestionService`](crate::traits::QuestionService).
    ///
    /// Engine errors raised inside a provider (for example while parsing the
    /// question payload) keep their class; anything else is a service error.
    pub fn from_service(err: anyhow::Error) -> Self {
        match err.downcast::<EngineError>() {
            Ok(engine_err) => engine_err,
            Err(other) => EngineError::Service(format!("{other:#}")),
        }
    }
}
