//! Mock-test session engine for preptest.
//!
//! This crate holds the data model, session state, countdown timer, screen
//! controller, scoring, and the engine that ties them together. It also
//! parses untimed practice sets. Network access goes through the
//! [`traits::QuestionService`] trait, implemented in `preptest-providers`.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod practice;
pub mod report;
pub mod screen;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod traits;
pub mod view;

pub use error::EngineError;
