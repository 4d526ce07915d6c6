//! Question payload parser.
//!
//! Turns the raw text returned by a language model into validated
//! [`Question`] records. The model is asked for a bare JSON array, but
//! answers wrapped in a markdown fence are accepted as well.

use crate::error::EngineError;
use crate::model::Question;

/// Extract the JSON payload from a model response.
///
/// Handles:
/// - a ```json``` fenced block (first one wins)
/// - a generic ``` block if no json-tagged block exists
/// - raw text with no fence (returned trimmed)
pub fn extract_json_payload(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block && json_block.is_none() {
                json_block = Some(current.clone());
            } else if is_generic_block && generic_block.is_none() {
                generic_block = Some(current.clone());
            }
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    // Unclosed fence: keep what we have
    if in_block && !current.is_empty() {
        if is_json_block && json_block.is_none() {
            json_block = Some(current);
        } else if is_generic_block && generic_block.is_none() {
            generic_block = Some(current);
        }
    }

    json_block
        .or(generic_block)
        .unwrap_or_else(|| response.trim().to_string())
}

/// Parse and validate exactly `expected` questions from a model response.
pub fn parse_questions(response: &str, expected: usize) -> Result<Vec<Question>, EngineError> {
    if response.trim().is_empty() {
        return Err(EngineError::NoContent("empty question payload".into()));
    }

    let payload = extract_json_payload(response);
    let questions: Vec<Question> = serde_json::from_str(&payload)
        .map_err(|e| EngineError::MalformedResponse(format!("invalid question JSON: {e}")))?;

    if questions.len() != expected {
        return Err(EngineError::MalformedResponse(format!(
            "expected {expected} questions, got {}",
            questions.len()
        )));
    }

    for (i, q) in questions.iter().enumerate() {
        q.validate()
            .map_err(|e| EngineError::MalformedResponse(format!("question {}: {e}", i + 1)))?;
    }

    Ok(questions)
}
