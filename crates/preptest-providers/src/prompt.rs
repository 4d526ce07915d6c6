//! Prompt builders for the question, feedback and practice-set calls.

use preptest_core::practice::{PracticeRequest, SOLUTION_MARKER};
use preptest_core::traits::{FeedbackRequest, QuestionRequest};

pub fn question_prompt(request: &QuestionRequest) -> String {
    format!(
        "Generate a set of {count} JEE Main style multiple-choice questions. \
         Subject: \"{subject}\", Topic: \"{topic}\", Difficulty: \"{difficulty}\". \
         Format as a valid JSON array of objects with keys: \"subject\", \"question\", \
         \"options\" (array of 4 strings, each starting with its letter, e.g. \"A) ...\"), \
         \"correctAnswer\" (letter A-D).",
        count = request.count,
        subject = request.subject,
        topic = request.topic,
        difficulty = request.difficulty,
    )
}

pub fn feedback_prompt(request: &FeedbackRequest) -> serde_json::Result<String> {
    let performance = serde_json::to_string(&request.per_question)?;
    Ok(format!(
        "A student completed a test on \"{topic}\" ({subject}). Score: {score}/{total}. \
         Correct: {correct}, Incorrect: {incorrect}. Performance Data: {performance}. \
         Provide constructive feedback in HTML format: 1. Overall summary. \
         2. Detailed analysis of incorrect answers. 3. Key concepts to revise.",
        topic = request.topic,
        subject = request.subject,
        score = request.score,
        total = request.total_marks,
        correct = request.correct_count,
        incorrect = request.incorrect_count,
    ))
}

pub fn practice_prompt(request: &PracticeRequest) -> String {
    format!(
        "You are an expert question paper setter for Indian competitive exams. \
         Generate {count} original practice questions on the topic of \"{topic}\" \
         for the {exam} exam in the subject of {subject}. \
         Start each question with \"**Question X:**\". After each question and its options \
         write the separator {SOLUTION_MARKER}, then the **Correct Answer** and a \
         **Step-by-Step Solution**.",
        count = request.count,
        topic = request.topic,
        exam = request.exam,
        subject = request.subject,
    )
}
