//! Recognition events and the recognizer capability.
//!
//! # Overview
//!
//! [`Recognizer`] is the interface the session consumes.  It is object-safe
//! and `Send + Sync` so the composition root can hold it behind an
//! `Arc<dyn Recognizer>` and start / stop it explicitly.  A running
//! recognizer is just a stream of tagged [`RecognitionEvent`]s delivered over
//! a `tokio::sync::mpsc` channel; the stream ends when the recognizer stops
//! or runs out of input.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel capacity used by the bundled recognizers.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// RecognitionEvent
// ---------------------------------------------------------------------------

/// One transcript emitted by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Provisional hypothesis for speech still in progress.  May be revised.
    Interim(String),
    /// Confirmed result.  Never revised.
    Final(String),
}

impl RecognitionEvent {
    pub fn text(&self) -> &str {
        match self {
            RecognitionEvent::Interim(text) | RecognitionEvent::Final(text) => text,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, RecognitionEvent::Final(_))
    }

    /// Parse one line of the text event format.
    ///
    /// ```text
    /// interim: the quick      → Interim("the quick")
    /// final: the quick brown  → Final("the quick brown")
    /// the quick brown fox     → Final(...)   (untagged)
    /// # comment / blank line  → None
    /// ```
    ///
    /// ```
    /// use voice_prompter::recognition::RecognitionEvent;
    ///
    /// assert_eq!(
    ///     RecognitionEvent::parse_line("interim: good evening"),
    ///     Some(RecognitionEvent::Interim("good evening".into()))
    /// );
    /// assert_eq!(RecognitionEvent::parse_line("   "), None);
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (tag, rest) = match line.split_once(':') {
            Some((tag, rest)) => (tag.trim().to_ascii_lowercase(), rest.trim()),
            None => return Some(RecognitionEvent::Final(line.to_string())),
        };

        let event = match tag.as_str() {
            "interim" | "partial" => RecognitionEvent::Interim(rest.to_string()),
            "final" => RecognitionEvent::Final(rest.to_string()),
            _ => return Some(RecognitionEvent::Final(line.to_string())),
        };

        if event.text().is_empty() {
            None
        } else {
            Some(event)
        }
    }
}

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// Errors raised while starting or stopping a recognizer.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// `start` was called while a previous run is still active.
    #[error("recognizer is already running")]
    AlreadyRunning,

    /// The recognizer's one-shot input has been used by an earlier run.
    #[error("recognizer input already consumed")]
    InputConsumed,

    /// Reading recognizer input failed.
    #[error("recognizer input failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Recognizer trait
// ---------------------------------------------------------------------------

/// A cancellable source of recognition events with an explicit lifecycle.
///
/// # Contract
///
/// - `start` returns the receiving end of a fresh event stream.
/// - `stop` cancels the stream; the receiver then drains and closes.
///   Stopping a recognizer that is not running is a no-op.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionEvent>, RecognizerError>;

    async fn stop(&self) -> Result<(), RecognizerError>;
}

// Compile-time assertion: Box<dyn Recognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Recognizer>) {}
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
