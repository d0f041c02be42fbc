//! Speech recognition boundary.
//!
//! The prompter never talks to a speech backend directly.  It consumes a
//! [`Recognizer`]: something that can be started, yields a stream of
//! interim / final [`RecognitionEvent`]s, and can be stopped.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Recognizer (trait)                       │
//! │                                                          │
//! │   ┌────────────────────┐    ┌───────────────────────┐    │
//! │   │ ScriptedRecognizer │    │ LineRecognizer<R>     │    │
//! │   │ fixed event list   │    │ "interim: …" lines    │    │
//! │   └─────────┬──────────┘    └──────────┬────────────┘    │
//! │             └────────────┬─────────────┘                 │
//! │                          ▼                               │
//! │            mpsc::Receiver<RecognitionEvent>              │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod lines;
pub mod scripted;
pub mod source;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use lines::LineRecognizer;
pub use scripted::ScriptedRecognizer;
pub use source::{RecognitionEvent, Recognizer, RecognizerError, EVENT_CHANNEL_CAPACITY};
