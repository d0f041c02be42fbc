//! Inactivity watchdog: warn, count down, then stop a stalled session.
//!
//! The watchdog is plain bookkeeping over [`Instant`]s supplied by the
//! caller, so it can be driven by a tokio interval in production and by
//! synthetic instants in tests.
//!
//! ```text
//! Disarmed ──arm──▶ Armed ──quiet for `inactivity`──▶ Warning(n)
//!                     ▲                                  │ every second: n-1
//!                     └──── record_progress / extend ────┤
//!                                                        └─ n == 0 ─▶ Expired (disarmed)
//! ```

use std::time::{Duration, Instant};

/// Length of one countdown step.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// WatchdogEvent
// ---------------------------------------------------------------------------

/// Result of [`InactivityWatchdog::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogEvent {
    /// Nothing changed.
    Quiet,
    /// The quiet period elapsed; the warning countdown starts at the value.
    WarningStarted(u32),
    /// The countdown moved; seconds left before the session stops.
    Countdown(u32),
    /// The countdown ran out.  Reported once; the watchdog is now disarmed.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disarmed,
    Armed { deadline: Instant },
    Warning { remaining: u32, next_step: Instant },
}

// ---------------------------------------------------------------------------
// InactivityWatchdog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct InactivityWatchdog {
    inactivity: Duration,
    warning_steps: u32,
    phase: Phase,
}

impl InactivityWatchdog {
    pub fn new(inactivity: Duration, warning_steps: u32) -> Self {
        Self {
            inactivity,
            warning_steps,
            phase: Phase::Disarmed,
        }
    }

    /// Start (or restart) the quiet period at `now`.
    pub fn arm(&mut self, now: Instant) {
        self.phase = Phase::Armed {
            deadline: now + self.inactivity,
        };
    }

    pub fn disarm(&mut self) {
        self.phase = Phase::Disarmed;
    }

    /// The speaker made progress: cancel any warning and restart the period.
    pub fn record_progress(&mut self, now: Instant) {
        self.arm(now);
    }

    /// The user asked for more time.  Ignored while disarmed.
    pub fn extend(&mut self, now: Instant) {
        if self.is_armed() {
            self.arm(now);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.phase != Phase::Disarmed
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.phase, Phase::Warning { .. })
    }

    /// Seconds left while a warning is showing.
    pub fn countdown(&self) -> Option<u32> {
        match self.phase {
            Phase::Warning { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    /// Advance the state machine to `now`.
    ///
    /// Late polls catch up: several elapsed countdown steps are applied at
    /// once and only the latest count is reported.
    pub fn poll(&mut self, now: Instant) -> WatchdogEvent {
        match self.phase {
            Phase::Disarmed => WatchdogEvent::Quiet,

            Phase::Armed { deadline } => {
                if now < deadline {
                    return WatchdogEvent::Quiet;
                }
                if self.warning_steps == 0 {
                    self.phase = Phase::Disarmed;
                    return WatchdogEvent::Expired;
                }
                self.phase = Phase::Warning {
                    remaining: self.warning_steps,
                    next_step: deadline + COUNTDOWN_STEP,
                };
                log::debug!("watchdog: no progress for {:?}, warning", self.inactivity);
                WatchdogEvent::WarningStarted(self.warning_steps)
            }

            Phase::Warning {
                mut remaining,
                mut next_step,
            } => {
                if now < next_step {
                    return WatchdogEvent::Quiet;
                }
                while now >= next_step && remaining > 0 {
                    remaining -= 1;
                    next_step += COUNTDOWN_STEP;
                }
                if remaining == 0 {
                    self.phase = Phase::Disarmed;
                    log::info!("watchdog: countdown expired");
                    return WatchdogEvent::Expired;
                }
                self.phase = Phase::Warning {
                    remaining,
                    next_step,
                };
                WatchdogEvent::Countdown(remaining)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
