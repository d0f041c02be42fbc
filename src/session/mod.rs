//! Prompter session: shared state and the async loop that follows a reading.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  RecognitionEvent  ┌───────────────┐  snapshot  ┌──────────┐
//! │  Recognizer  │ ─────────────────▶ │ PromptSession │ ─────────▶ │ renderer │
//! └──────────────┘                    │  (run loop)   │   watch    └──────────┘
//! ┌──────────────┐  SessionCommand    │               │
//! │   controls   │ ─────────────────▶ │  1 s watchdog │
//! └──────────────┘                    └───────┬───────┘
//!                                             ▼
//!                                SharedState (Arc<Mutex<SessionState>>)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_prompter::config::AppConfig;
//! use voice_prompter::recognition::LineRecognizer;
//! use voice_prompter::script::Script;
//! use voice_prompter::session::{new_shared_state, PromptSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = new_shared_state(AppConfig::default(), Script::new("Hello there."));
//! let (_controls, commands) = tokio::sync::mpsc::channel(8);
//! let outcome = PromptSession::new(state, None)
//!     .run_with(&LineRecognizer::stdin(), commands)
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod runner;
pub mod state;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use runner::{PromptSession, SessionCommand, SessionOutcome};
pub use state::{
    lock_state, new_shared_state, ProgressSnapshot, SessionState, SessionStatus, SharedState,
};
