//! Report rendering for finished preptest sessions.
//!
//! JSON persistence lives on [`preptest_core::report::TestReport`]; this
//! crate turns a report into a standalone HTML page.

pub mod html;
