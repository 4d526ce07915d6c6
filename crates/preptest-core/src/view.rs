//! Pure view derivation.
//!
//! Every function here maps engine state to display values and nothing
//! else, so the front end re-renders by calling them again after any
//! mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::FeedbackOutcome;
use crate::model::Choice;
use crate::scoring::ScoreSummary;
use crate::session::{NavState, Session};
use crate::timer::Countdown;

/// Shown in place of feedback when the service fails.
pub const FEEDBACK_APOLOGY: &str =
    "<p class=\"error\">Sorry, we couldn't generate feedback at this time.</p>";

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// How generated feedback is inserted into the results view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolicy {
    /// Insert the service's HTML as-is.
    #[default]
    Trusted,
    /// Escape the service's text so no markup survives.
    Escaped,
}

impl FeedbackPolicy {
    pub fn apply(self, html: &str) -> String {
        match self {
            FeedbackPolicy::Trusted => html.to_string(),
            FeedbackPolicy::Escaped => html_escape(html),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub letter: Choice,
    pub text: String,
    pub selected: bool,
}

/// The active screen for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// `"Question 2 / 4"`.
    pub counter: String,
    /// `"Physics - Kinematics"`.
    pub heading: String,
    pub text: String,
    pub options: Vec<OptionView>,
    pub nav: NavState,
}

pub fn render_question(session: &Session) -> QuestionView {
    let question = session.current_question();
    let selected = session.current_answer();

    QuestionView {
        counter: format!(
            "Question {} / {}",
            session.current_index() + 1,
            session.len()
        ),
        heading: format!("{} - {}", question.subject, session.setup().topic.trim()),
        text: question.question.clone(),
        options: question
            .lettered_options()
            .map(|(letter, text)| OptionView {
                letter,
                text: text.to_string(),
                selected: selected == Some(letter),
            })
            .collect(),
        nav: session.nav_state(),
    }
}

impl fmt::Display for QuestionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  [{}]", self.counter, self.heading)?;
        writeln!(f)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        for option in &self.options {
            let marker = if option.selected { '*' } else { ' ' };
            writeln!(f, " {marker} {}", option.text)?;
        }
        writeln!(f)?;

        let mut controls = Vec::new();
        if self.nav.prev_enabled {
            controls.push("[p]rev");
        }
        if self.nav.next_visible {
            controls.push("[n]ext");
        }
        if self.nav.submit_visible {
            controls.push("[s]ubmit");
        }
        write!(f, "a-d select | {}", controls.join(" | "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub display: String,
    pub urgent: bool,
}

pub fn render_timer(countdown: &Countdown) -> TimerView {
    TimerView {
        display: countdown.display(),
        urgent: countdown.is_urgent(),
    }
}

/// What the feedback area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackView {
    /// Request in flight; the loading indicator is visible.
    Loading,
    /// Final HTML; the loading indicator is gone.
    Html(String),
}

impl FeedbackView {
    pub fn loader_visible(&self) -> bool {
        matches!(self, FeedbackView::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    /// `"score / totalMarks"`.
    pub score_line: String,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub feedback: FeedbackView,
}

pub fn render_results(
    summary: &ScoreSummary,
    feedback: Option<&FeedbackOutcome>,
    policy: FeedbackPolicy,
) -> ResultsView {
    ResultsView {
        score_line: summary.display(),
        correct: summary.correct_count,
        incorrect: summary.incorrect_count,
        unanswered: summary.unanswered_count,
        feedback: match feedback {
            None => FeedbackView::Loading,
            Some(outcome) => FeedbackView::Html(render_feedback(outcome, policy)),
        },
    }
}

/// HTML for a settled feedback request.
pub fn render_feedback(outcome: &FeedbackOutcome, policy: FeedbackPolicy) -> String {
    match outcome {
        FeedbackOutcome::Generated(html) => policy.apply(html),
        FeedbackOutcome::Unavailable => FEEDBACK_APOLOGY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Question, TestSetup};
    use crate::scoring::score_session;
    use crate::session::tests::make_session;

    #[test]
    fn question_view_reflects_selection() {
        let mut session = make_session(&[Choice::A, Choice::B]);
        session.select_option(Choice::C);

        let view = render_question(&session);
        assert_eq!(view.counter, "Question 1 / 2");
        assert_eq!(view.heading, "Physics - Kinematics");
        let selected: Vec<Choice> = view
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.letter)
            .collect();
        assert_eq!(selected, vec![Choice::C]);
        assert!(!view.nav.prev_enabled);
        assert!(view.nav.next_visible);
    }

    #[test]
    fn selection_highlights_exactly_one_unprefixed_option() {
        let question = Question {
            subject: "Physics".into(),
            question: "Which is fastest?".into(),
            options: vec![
                "10 m/s".into(),
                "20 m/s".into(),
                "A car at 30 m/s".into(),
                "5 m/s".into(),
            ],
            correct_answer: Choice::C,
        };
        let setup = TestSetup::new("Physics", "Kinematics", Difficulty::Medium, 5);
        let mut session = Session::new(setup, vec![question]).unwrap();
        session.select_option(Choice::C);

        let view = render_question(&session);
        let letters: Vec<Choice> = view.options.iter().map(|o| o.letter).collect();
        assert_eq!(letters, Choice::ALL);
        let selected: Vec<&str> = view
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.text.as_str())
            .collect();
        assert_eq!(selected, vec!["A car at 30 m/s"]);
    }

    #[test]
    fn rerender_after_repeat_selection_is_identical() {
        let mut session = make_session(&[Choice::A, Choice::B]);
        session.select_option(Choice::B);
        let first = render_question(&session);
        session.select_option(Choice::B);
        assert_eq!(render_question(&session), first);
    }

    #[test]
    fn question_view_text_lists_controls() {
        let mut session = make_session(&[Choice::A, Choice::B]);
        session.go_next();
        session.select_option(Choice::A);
        let text = render_question(&session).to_string();
        assert!(text.contains("Question 2 / 2"));
        assert!(text.contains(" * A) option 2a"));
        assert!(text.contains("[p]rev | [s]ubmit"));
        assert!(!text.contains("[n]ext"));
    }

    #[test]
    fn timer_view() {
        let mut countdown = Countdown::start(61);
        assert!(!render_timer(&countdown).urgent);
        countdown.tick();
        let view = render_timer(&countdown);
        assert_eq!(view.display, "01:00");
        assert!(view.urgent);
    }

    #[test]
    fn results_view_feedback_states() {
        let session = make_session(&[Choice::A]);
        let summary = score_session(&session);

        let pending = render_results(&summary, None, FeedbackPolicy::Trusted);
        assert_eq!(pending.score_line, "0 / 4");
        assert!(pending.feedback.loader_visible());

        let ok = FeedbackOutcome::Generated("<h3>Good work</h3>".into());
        let done = render_results(&summary, Some(&ok), FeedbackPolicy::Trusted);
        assert_eq!(done.feedback, FeedbackView::Html("<h3>Good work</h3>".into()));
        assert!(!done.feedback.loader_visible());

        let escaped = render_results(&summary, Some(&ok), FeedbackPolicy::Escaped);
        assert_eq!(
            escaped.feedback,
            FeedbackView::Html("&lt;h3&gt;Good work&lt;/h3&gt;".into())
        );

        let failed = render_results(&summary, Some(&FeedbackOutcome::Unavailable), FeedbackPolicy::Trusted);
        assert_eq!(failed.feedback, FeedbackView::Html(FEEDBACK_APOLOGY.into()));
    }

    #[test]
    fn escape_covers_quotes() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }
}
