//! Caller-owned progress state.
//!
//! * [`ProgressTracker`]: final / interim positions and the rules for
//!   adopting matcher results.
//! * [`InactivityWatchdog`]: warns and eventually stops a session that has
//!   stopped making progress.

pub mod tracker;
pub mod watchdog;

pub use tracker::{ProgressTracker, RenderedScript, UnitStatus};
pub use watchdog::{InactivityWatchdog, WatchdogEvent, COUNTDOWN_STEP};
