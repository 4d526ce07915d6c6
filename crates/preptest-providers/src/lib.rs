//! Question service integrations for preptest.
//!
//! Implements the `QuestionService` trait for Google's Gemini API and an
//! offline mock, and loads the configuration that selects between them.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod prompt;

pub use config::{create_service, load_config, ApiConfig, PreptestConfig};
pub use error::ProviderError;
