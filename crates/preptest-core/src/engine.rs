//! Mock-test engine.
//!
//! Owns the screen controller, session, countdown, and results of one
//! attempt and drives them through Setup → Loading → Active → Results.
//! The engine never sleeps or spawns: the front end feeds it user input
//! and one-second ticks, and listens through an [`EngineObserver`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{Choice, TestSetup};
use crate::report::TestReport;
use crate::screen::{Screen, ScreenController, Transition, DEFAULT_FADE_IN_DELAY, DEFAULT_FADE_OUT};
use crate::scoring::{score_session, ScoreSummary};
use crate::session::Session;
use crate::timer::{Countdown, TimerEvent, TimerTick};
use crate::traits::{FeedbackRequest, QuestionRequest, QuestionService};
use crate::view::{self, FeedbackPolicy, QuestionView, ResultsView, TimerView};

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fade-out time of the outgoing screen.
    pub fade_out: Duration,
    /// Delay before the incoming screen fades in.
    pub fade_in_delay: Duration,
    /// How generated feedback is inserted into the results view.
    pub feedback_policy: FeedbackPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_out: DEFAULT_FADE_OUT,
            fade_in_delay: DEFAULT_FADE_IN_DELAY,
            feedback_policy: FeedbackPolicy::default(),
        }
    }
}

/// How the feedback request settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "html", rename_all = "lowercase")]
pub enum FeedbackOutcome {
    /// The service returned this (non-empty) HTML.
    Generated(String),
    /// The request failed or came back empty.
    Unavailable,
}

/// Progress notifications from the engine.
pub trait EngineObserver: Send + Sync {
    fn on_screen_change(&self, transition: &Transition);
    fn on_tick(&self, tick: &TimerTick);
    fn on_error(&self, error: &EngineError);
    fn on_submitted(&self, summary: &ScoreSummary);
    fn on_feedback_pending(&self);
    fn on_feedback_ready(&self, outcome: &FeedbackOutcome);
}

/// No-op observer.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn on_screen_change(&self, _: &Transition) {}
    fn on_tick(&self, _: &TimerTick) {}
    fn on_error(&self, _: &EngineError) {}
    fn on_submitted(&self, _: &ScoreSummary) {}
    fn on_feedback_pending(&self) {}
    fn on_feedback_ready(&self, _: &FeedbackOutcome) {}
}

/// The mock-test session engine.
pub struct MockTestEngine {
    service: Arc<dyn QuestionService>,
    config: EngineConfig,
    screens: ScreenController,
    session: Option<Session>,
    countdown: Option<Countdown>,
    summary: Option<ScoreSummary>,
    feedback: Option<FeedbackOutcome>,
}

impl MockTestEngine {
    pub fn new(service: Arc<dyn QuestionService>, config: EngineConfig) -> Self {
        let screens = ScreenController::new(config.fade_out, config.fade_in_delay);
        Self {
            service,
            config,
            screens,
            session: None,
            countdown: None,
            summary: None,
            feedback: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screens.current()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub fn summary(&self) -> Option<&ScoreSummary> {
        self.summary.as_ref()
    }

    pub fn feedback(&self) -> Option<&FeedbackOutcome> {
        self.feedback.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the setup form, fetch questions, and start the clock.
    ///
    /// A validation failure leaves the engine untouched. A service failure
    /// returns the flow to Setup.
    pub async fn start_session(
        &mut self,
        setup: TestSetup,
        observer: &dyn EngineObserver,
    ) -> Result<(), EngineError> {
        if let Err(e) = setup.validate() {
            observer.on_error(&e);
            return Err(e);
        }

        let transition = match self.screens.switch(Screen::Loading) {
            Ok(transition) => transition,
            Err(e) => {
                observer.on_error(&e);
                return Err(e);
            }
        };
        observer.on_screen_change(&transition);

        let request = QuestionRequest::for_setup(&setup);
        let total_secs = setup.total_seconds();
        tracing::info!(
            service = self.service.name(),
            subject = %request.subject,
            topic = %request.topic,
            difficulty = %request.difficulty,
            count = request.count,
            "requesting questions"
        );

        let generated = self
            .service
            .generate_questions(&request)
            .await
            .map_err(EngineError::from_service)
            .and_then(|questions| {
                if questions.len() != request.count {
                    return Err(EngineError::MalformedResponse(format!(
                        "expected {} questions, got {}",
                        request.count,
                        questions.len()
                    )));
                }
                Session::new(setup, questions)
            });

        match generated {
            Ok(session) => {
                tracing::info!(session_id = %session.id(), questions = session.len(), "session started");
                self.session = Some(session);
                self.countdown = Some(Countdown::start(total_secs));
                let transition = self.screens.switch(Screen::Active)?;
                observer.on_screen_change(&transition);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("question generation failed: {e}");
                observer.on_error(&e);
                let transition = self.screens.switch(Screen::Setup)?;
                observer.on_screen_change(&transition);
                Err(e)
            }
        }
    }

    fn active_session_mut(&mut self) -> Result<&mut Session, EngineError> {
        if self.screens.current() != Screen::Active {
            return Err(EngineError::NoActiveSession);
        }
        self.session.as_mut().ok_or(EngineError::NoActiveSession)
    }

    /// Record an answer for the current question.
    pub fn select_option(&mut self, choice: Choice) -> Result<bool, EngineError> {
        Ok(self.active_session_mut()?.select_option(choice))
    }

    pub fn go_next(&mut self) -> Result<bool, EngineError> {
        Ok(self.active_session_mut()?.go_next())
    }

    pub fn go_prev(&mut self) -> Result<bool, EngineError> {
        Ok(self.active_session_mut()?.go_prev())
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the score summary when this tick expired the countdown and
    /// submitted the session.
    pub fn tick(&mut self, observer: &dyn EngineObserver) -> Option<ScoreSummary> {
        let event = self.countdown.as_mut()?.tick();
        match event {
            TimerEvent::Tick(tick) => {
                observer.on_tick(&tick);
                None
            }
            TimerEvent::Expired(tick) => {
                observer.on_tick(&tick);
                tracing::info!("time is up, submitting");
                match self.submit(observer) {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        observer.on_error(&e);
                        None
                    }
                }
            }
            TimerEvent::Idle => None,
        }
    }

    /// End the attempt and mark it.
    ///
    /// The countdown is cancelled before anything else. Calling this again
    /// returns the same summary without further side effects.
    pub fn submit(&mut self, observer: &dyn EngineObserver) -> Result<ScoreSummary, EngineError> {
        if let Some(summary) = self.summary {
            return Ok(summary);
        }
        let session = self.session.as_ref().ok_or(EngineError::NoActiveSession)?;

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.cancel();
        }

        let transition = self.screens.switch(Screen::Results)?;
        observer.on_screen_change(&transition);

        let summary = score_session(session);
        tracing::info!(
            session_id = %session.id(),
            score = summary.score,
            total = summary.total_marks,
            correct = summary.correct_count,
            incorrect = summary.incorrect_count,
            "session submitted"
        );
        self.summary = Some(summary);
        observer.on_submitted(&summary);
        Ok(summary)
    }

    /// Ask the service for feedback on the submitted attempt.
    ///
    /// Service failures never surface as errors: they settle as
    /// [`FeedbackOutcome::Unavailable`].
    pub async fn request_feedback(
        &mut self,
        observer: &dyn EngineObserver,
    ) -> Result<FeedbackOutcome, EngineError> {
        if let Some(outcome) = &self.feedback {
            return Ok(outcome.clone());
        }
        let session = self.session.as_ref().ok_or(EngineError::NoActiveSession)?;
        let summary = self.summary.ok_or(EngineError::NotSubmitted)?;
        let request = FeedbackRequest::for_session(session, &summary);

        observer.on_feedback_pending();
        let outcome = match self.service.generate_feedback(&request).await {
            Ok(text) if !text.trim().is_empty() => FeedbackOutcome::Generated(text),
            Ok(_) => {
                tracing::warn!("feedback service returned no content");
                FeedbackOutcome::Unavailable
            }
            Err(e) => {
                tracing::warn!("feedback request failed: {e:#}");
                FeedbackOutcome::Unavailable
            }
        };

        self.feedback = Some(outcome.clone());
        observer.on_feedback_ready(&outcome);
        Ok(outcome)
    }

    /// Discard the attempt and return to Setup.
    pub fn restart(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.cancel();
        }
        self.session = None;
        self.countdown = None;
        self.summary = None;
        self.feedback = None;
        self.screens.reset();
        tracing::debug!("engine reset");
    }

    pub fn question_view(&self) -> Option<QuestionView> {
        if self.screens.current() != Screen::Active {
            return None;
        }
        self.session.as_ref().map(view::render_question)
    }

    pub fn timer_view(&self) -> Option<TimerView> {
        self.countdown.as_ref().map(view::render_timer)
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.summary.as_ref().map(|summary| {
            view::render_results(summary, self.feedback.as_ref(), self.config.feedback_policy)
        })
    }

    /// Snapshot of the submitted attempt for persistence.
    pub fn report(&self) -> Option<TestReport> {
        let session = self.session.as_ref()?;
        let summary = self.summary?;
        let elapsed_secs = self.countdown.as_ref().map_or(0, Countdown::elapsed_secs);
        Some(TestReport::from_session(
            session,
            summary,
            elapsed_secs,
            self.feedback.clone(),
        ))
    }
}
