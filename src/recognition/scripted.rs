//! A recognizer that replays a fixed list of events.
//!
//! Used to drive sessions deterministically in tests and demos without any
//! audio or speech backend.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::source::{RecognitionEvent, Recognizer, RecognizerError, EVENT_CHANNEL_CAPACITY};

/// Replays `events` in order, optionally pausing before each one.
///
/// # Example
///
/// ```rust
/// use voice_prompter::recognition::{RecognitionEvent, Recognizer, ScriptedRecognizer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let recognizer = ScriptedRecognizer::new(vec![
///     RecognitionEvent::Interim("good".into()),
///     RecognitionEvent::Final("good evening".into()),
/// ]);
/// let mut rx = recognizer.start().await.unwrap();
/// assert_eq!(rx.recv().await, Some(RecognitionEvent::Interim("good".into())));
/// # }
/// ```
pub struct ScriptedRecognizer {
    events: Vec<RecognitionEvent>,
    delay: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScriptedRecognizer {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            delay: Duration::ZERO,
            task: Mutex::new(None),
        }
    }

    /// Pause `delay` before emitting each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionEvent>, RecognizerError> {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(RecognizerError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let events = self.events.clone();
        let delay = self.delay;

        *task = Some(tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }));

        log::debug!("scripted recognizer: started with {} events", self.events.len());
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), RecognizerError> {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            log::debug!("scripted recognizer: stopped");
        }
        Ok(())
    }
}
