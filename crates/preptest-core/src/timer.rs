//! Countdown timer.
//!
//! The countdown is driven from outside: the front end calls
//! [`Countdown::tick`] once per second (a tokio interval in the CLI, a plain
//! loop in tests). Expiry is reported exactly once.

use std::fmt;

/// Remaining time at or below which the display switches to urgent.
pub const URGENT_THRESHOLD_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running,
    Cancelled,
    Expired,
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed and time remains.
    Tick(TimerTick),
    /// The countdown just reached zero. Emitted once.
    Expired(TimerTick),
    /// The countdown is cancelled or already expired; nothing happened.
    Idle,
}

/// Snapshot of the clock after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub remaining_secs: u32,
    pub urgent: bool,
}

impl TimerTick {
    fn at(remaining_secs: u32) -> Self {
        Self {
            remaining_secs,
            urgent: remaining_secs <= URGENT_THRESHOLD_SECS,
        }
    }

    /// `MM:SS`, zero padded.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

/// A cancellable one-second-resolution countdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    total_secs: u32,
    remaining_secs: u32,
    state: CountdownState,
}

impl Countdown {
    pub fn start(total_secs: u32) -> Self {
        tracing::debug!(total_secs, "countdown started");
        Self {
            total_secs,
            remaining_secs: total_secs,
            state: CountdownState::Running,
        }
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining_secs <= URGENT_THRESHOLD_SECS
    }

    /// `MM:SS` for the current remaining time.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) -> TimerEvent {
        if self.state != CountdownState::Running {
            return TimerEvent::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let tick = TimerTick::at(self.remaining_secs);
        if self.remaining_secs == 0 {
            self.state = CountdownState::Expired;
            tracing::debug!("countdown expired");
            TimerEvent::Expired(tick)
        } else {
            TimerEvent::Tick(tick)
        }
    }

    /// Stop the countdown. Returns `false` if it was not running.
    pub fn cancel(&mut self) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        self.state = CountdownState::Cancelled;
        true
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
