//! Screen controller.
//!
//! Four mutually exclusive phases with a timed cross-fade between them.
//! The controller commits visibility in one step, so exactly one screen is
//! visible at any time; the fade timings travel with the returned
//! [`Transition`] for the presentation layer to play.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Time to fade the outgoing screen to zero opacity.
pub const DEFAULT_FADE_OUT: Duration = Duration::from_millis(500);

/// Delay before the incoming screen fades to full opacity.
pub const DEFAULT_FADE_IN_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Setup,
    Loading,
    Active,
    Results,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Setup, Screen::Loading, Screen::Active, Screen::Results];

    /// Whether the flow allows moving from `self` to `to`.
    ///
    /// Results has no outgoing edge; only a full reset leaves it.
    pub fn can_switch_to(self, to: Screen) -> bool {
        matches!(
            (self, to),
            (Screen::Setup, Screen::Loading)
                | (Screen::Loading, Screen::Active)
                | (Screen::Loading, Screen::Setup)
                | (Screen::Active, Screen::Results)
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Setup => write!(f, "setup"),
            Screen::Loading => write!(f, "loading"),
            Screen::Active => write!(f, "active"),
            Screen::Results => write!(f, "results"),
        }
    }
}

/// A committed screen change and how to animate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
    /// Fade `from` to opacity 0 over this long, then hide it and show `to`.
    pub fade_out: Duration,
    /// Wait this long after showing `to` before fading it to full opacity.
    pub fade_in_delay: Duration,
}

impl Transition {
    /// Total time the animation takes.
    pub fn duration(&self) -> Duration {
        self.fade_out + self.fade_in_delay
    }
}

/// Tracks which screen is visible.
#[derive(Debug, Clone)]
pub struct ScreenController {
    current: Screen,
    fade_out: Duration,
    fade_in_delay: Duration,
}

impl Default for ScreenController {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_OUT, DEFAULT_FADE_IN_DELAY)
    }
}

impl ScreenController {
    pub fn new(fade_out: Duration, fade_in_delay: Duration) -> Self {
        Self {
            current: Screen::Setup,
            fade_out,
            fade_in_delay,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_visible(&self, screen: Screen) -> bool {
        self.current == screen
    }

    /// Hide the current screen and show `to`.
    pub fn switch(&mut self, to: Screen) -> Result<Transition, EngineError> {
        let from = self.current;
        if !from.can_switch_to(to) {
            return Err(EngineError::InvalidTransition { from, to });
        }
        self.current = to;
        tracing::debug!(%from, %to, "screen switched");
        Ok(Transition {
            from,
            to,
            fade_out: self.fade_out,
            fade_in_delay: self.fade_in_delay,
        })
    }

    /// Return to Setup unconditionally, the equivalent of a page reload.
    pub fn reset(&mut self) {
        self.current = Screen::Setup;
    }
}
