//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use preptest_core::model::Choice;
use preptest_core::report::{QuestionOutcome, TestReport};
use preptest_core::scoring::{Verdict, NOT_ANSWERED};
use preptest_core::timer::format_clock;
use preptest_core::view::{html_escape, render_feedback, FeedbackPolicy};

/// Generate an HTML page for a finished attempt.
///
/// Generated feedback goes through `policy` exactly as it does on the
/// results screen.
pub fn generate_html(report: &TestReport, policy: FeedbackPolicy) -> String {
    let mut html = String::new();
    let setup = &report.setup;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>preptest report: {} - {}</title>\n",
        html_escape(&setup.subject),
        html_escape(&setup.topic)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>{} - {}</h1>\n",
        html_escape(&setup.subject),
        html_escape(&setup.topic)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} questions | {} min allowed | {} used | {}</p>\n",
        setup.difficulty,
        report.outcomes.len(),
        setup.duration_minutes,
        format_clock(report.elapsed_secs),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score
    let summary = &report.summary;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Score</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">{}</p>\n",
        html_escape(&summary.display())
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Correct</th><th>Incorrect</th><th>Unanswered</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td class=\"correct\">{}</td><td class=\"incorrect\">{}</td><td class=\"unanswered\">{}</td></tr></tbody>\n",
        summary.correct_count, summary.incorrect_count, summary.unanswered_count
    ));
    html.push_str("</table>\n");
    if !report.outcomes.is_empty() {
        html.push_str(&generate_breakdown_bar(
            summary.correct_count,
            summary.incorrect_count,
            summary.unanswered_count,
        ));
    }
    html.push_str("</section>\n");

    // Per-question results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Correct</th><th>Marks</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, outcome) in report.outcomes.iter().enumerate() {
        html.push_str(&question_row(i + 1, outcome));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Feedback
    if let Some(feedback) = &report.feedback {
        html.push_str("<section class=\"feedback\">\n");
        html.push_str("<h2>Feedback</h2>\n");
        html.push_str(&render_feedback(feedback, policy));
        html.push_str("\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &TestReport, policy: FeedbackPolicy, path: &Path) -> Result<()> {
    let html = generate_html(report, policy);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn question_row(number: usize, outcome: &QuestionOutcome) -> String {
    let class = match outcome.verdict {
        Verdict::Correct => "correct",
        Verdict::Incorrect => "incorrect",
        Verdict::Unanswered => "unanswered",
    };
    let answer = outcome
        .user_answer
        .map(|c| option_text(outcome, c))
        .unwrap_or_else(|| NOT_ANSWERED.to_string());

    format!(
        "<tr class=\"{class}\"><td>{number}</td><td>{}</td><td>{}</td><td>{}</td><td>{:+}</td></tr>\n",
        html_escape(&outcome.question),
        html_escape(&answer),
        html_escape(&option_text(outcome, outcome.correct_answer)),
        outcome.marks,
    )
}

/// The option text for a letter, or the bare letter if it is missing.
fn option_text(outcome: &QuestionOutcome, choice: Choice) -> String {
    outcome
        .options
        .get(choice.index())
        .cloned()
        .unwrap_or_else(|| choice.to_string())
}

/// Single stacked bar of correct / incorrect / unanswered counts.
fn generate_breakdown_bar(correct: u32, incorrect: u32, unanswered: u32) -> String {
    let max_width = 600.0;
    let bar_height = 30;
    let total = (correct + incorrect + unanswered).max(1) as f64;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width as usize,
        bar_height
    );

    let mut x = 0usize;
    for (count, color) in [
        (correct, "#22c55e"),
        (incorrect, "#ef4444"),
        (unanswered, "#9ca3af"),
    ] {
        if count == 0 {
            continue;
        }
        let width = (count as f64 / total * max_width) as usize;
        svg.push_str(&format!(
            "  <rect x=\"{x}\" y=\"0\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#fff\" dominant-baseline=\"middle\">{count}</text>\n",
            x + 6,
            bar_height / 2
        ));
        x += width;
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --incorrect: #fde2e2; --unanswered: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --incorrect: #7f1d1d; --unanswered: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 2.5rem; font-weight: bold; margin: 0.5rem 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.correct { background: var(--correct); }
.incorrect { background: var(--incorrect); }
.unanswered { background: var(--unanswered); }
.feedback .error { color: #ef4444; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; border-radius: 4px; }
"#;
