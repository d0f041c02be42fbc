//! A recognizer fed by tagged text lines (stdin, a file, a pipe).
//!
//! Each line is parsed with [`RecognitionEvent::parse_line`].  This lets an
//! external speech backend, or a person typing, drive the prompter through a
//! plain text pipe.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::source::{RecognitionEvent, Recognizer, RecognizerError, EVENT_CHANNEL_CAPACITY};

/// Reads events from `reader` until end of input or [`Recognizer::stop`].
///
/// The reader is consumed by the first [`Recognizer::start`]; later starts
/// fail with [`RecognizerError::InputConsumed`].  A read failure closes the
/// stream and is returned by the next [`Recognizer::stop`].
pub struct LineRecognizer<R> {
    reader: Mutex<Option<R>>,
    task: Mutex<Option<JoinHandle<()>>>,
    failure: Arc<Mutex<Option<std::io::Error>>>,
}

impl<R> LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
            task: Mutex::new(None),
            failure: Arc::new(Mutex::new(None)),
        }
    }
}

impl LineRecognizer<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Recognizer over the process's standard input.
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> Recognizer for LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionEvent>, RecognizerError> {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(RecognizerError::AlreadyRunning);
        }
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(RecognizerError::InputConsumed)?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let failure = Arc::clone(&self.failure);
        *task = Some(tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(event) = RecognitionEvent::parse_line(&line) else {
                            continue;
                        };
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        log::debug!("line recognizer: end of input");
                        break;
                    }
                    Err(e) => {
                        log::warn!("line recognizer: read failed: {e}");
                        *failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(e);
                        break;
                    }
                }
            }
        }));

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
        }
        match self.failure.lock().unwrap_or_else(|e| e.into_inner()).take() {
            Some(e) => Err(RecognizerError::Io(e)),
            None => Ok(()),
        }
    }
}
