//! Session runner: drives recognition events → progress → display state.
//!
//! [`PromptSession`] owns the [`SharedState`] while it runs and reacts to
//! three inputs multiplexed with `tokio::select!`:
//!
//! ```text
//! RecognitionEvent::Final(text)
//!   └─▶ tracker.apply_final         (always, even when not listening)
//! RecognitionEvent::Interim(text)
//!   └─▶ tracker.apply_interim       (only while Started)
//!         adopted progress ─▶ watchdog.record_progress, clear warning
//!
//! SessionCommand (Start / Stop / ExtendTimeout / JumpTo / content / edit toggles)
//!
//! 1 s tick ─▶ watchdog.poll
//!               ├─ WarningStarted / Countdown ─▶ show warning
//!               └─ Expired ─▶ stop, return TimedOut
//! ```
//!
//! Every change is published as a [`ProgressSnapshot`] on a `watch` channel.

use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::matcher::AlignParams;
use crate::progress::{InactivityWatchdog, WatchdogEvent, COUNTDOWN_STEP};
use crate::recognition::{RecognitionEvent, Recognizer, RecognizerError};
use crate::script::ScriptStore;

use super::state::{lock_state, ProgressSnapshot, SessionState, SessionStatus, SharedState};

// ---------------------------------------------------------------------------
// SessionCommand / SessionOutcome
// ---------------------------------------------------------------------------

/// Control input from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Follow the speaker again (after an edit mode).
    Start,
    /// Stop following and end the run.
    Stop,
    /// Dismiss the timeout warning and restart the quiet period.
    ExtendTimeout,
    /// Replace the script.
    SetContent(String),
    /// Show the placeholder and forget the persisted script.
    ClearContent,
    ToggleQuickEdit,
    ToggleEditor,
    /// Move both positions to a unit, forward or backward.
    JumpTo(usize),
}

/// Why [`PromptSession::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The recognizer's event stream ended.
    SourceClosed,
    /// A [`SessionCommand::Stop`] was received.
    Stopped,
    /// The inactivity watchdog expired.
    TimedOut,
}

// ---------------------------------------------------------------------------
// PromptSession
// ---------------------------------------------------------------------------

/// Follows one reading of the script.
///
/// ```rust,no_run
/// use voice_prompter::config::AppConfig;
/// use voice_prompter::recognition::{RecognitionEvent, ScriptedRecognizer};
/// use voice_prompter::script::Script;
/// use voice_prompter::session::{new_shared_state, PromptSession};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let state = new_shared_state(config, Script::new("Good evening, and welcome."));
/// let recognizer = ScriptedRecognizer::new(vec![
///     RecognitionEvent::Final("good evening and welcome".into()),
/// ]);
///
/// let (_commands_tx, commands_rx) = tokio::sync::mpsc::channel(8);
/// let outcome = PromptSession::new(state, None)
///     .run_with(&recognizer, commands_rx)
///     .await
///     .unwrap();
/// println!("{outcome:?}");
/// # }
/// ```
pub struct PromptSession {
    state: SharedState,
    store: Option<ScriptStore>,
    params: AlignParams,
    watchdog: Option<InactivityWatchdog>,
    updates: watch::Sender<ProgressSnapshot>,
}

impl PromptSession {
    /// Create a session over `state`.
    ///
    /// Tunables are read from `state.config`.  `store` persists content
    /// changes when `config.script.persist` is set.
    pub fn new(state: SharedState, store: Option<ScriptStore>) -> Self {
        let (params, watchdog, snapshot) = {
            let st = lock_state(&state);
            let watchdog = st.config.watchdog.enabled.then(|| {
                InactivityWatchdog::new(
                    st.config.watchdog.inactivity(),
                    st.config.watchdog.warning_secs,
                )
            });
            (st.config.matcher.align_params(), watchdog, st.snapshot())
        };
        let (updates, _) = watch::channel(snapshot);

        Self {
            state,
            store,
            params,
            watchdog,
            updates,
        }
    }

    /// Receive a [`ProgressSnapshot`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.updates.subscribe()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Start `recognizer`, run until the session ends, then stop it.
    pub async fn run_with(
        self,
        recognizer: &dyn Recognizer,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Result<SessionOutcome, RecognizerError> {
        let events = recognizer.start().await?;
        let outcome = self.run(events, commands).await;
        recognizer.stop().await?;
        Ok(outcome)
    }

    /// Reset both positions, enter [`SessionStatus::Started`] and follow
    /// `events` until the stream closes, a `Stop` command arrives or the
    /// watchdog expires.
    ///
    /// A closed command channel is not an error; the session keeps following
    /// events.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<RecognitionEvent>,
        mut commands: mpsc::Receiver<SessionCommand>,
    ) -> SessionOutcome {
        // Every run reads the script from the top.
        lock_state(&self.state).progress.reset();
        self.start(now());

        let mut tick = tokio::time::interval(COUNTDOWN_STEP);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        let outcome = loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, now()),
                    None => {
                        log::info!("session: recognition stream closed");
                        break SessionOutcome::SourceClosed;
                    }
                },
                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if let Some(outcome) = self.handle_command(command, now()) {
                            break outcome;
                        }
                    }
                    None => {
                        log::debug!("session: command channel closed");
                        commands_open = false;
                    }
                },
                _ = tick.tick() => {
                    if self.handle_tick(now()) {
                        break SessionOutcome::TimedOut;
                    }
                }
            }
        };

        self.stop();
        // Finals already delivered before the stop still count.
        while let Ok(event) = events.try_recv() {
            if event.is_final() {
                self.handle_event(event, now());
            }
        }

        log::info!("session: ended ({outcome:?})");
        outcome
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    fn start(&mut self, now: Instant) {
        {
            let mut st = lock_state(&self.state);
            st.status = SessionStatus::Started;
            st.mark_progress(now);
        }
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.arm(now);
        }
        log::info!("session: started");
        self.publish();
    }

    fn stop(&mut self) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.disarm();
        }
        {
            let mut st = lock_state(&self.state);
            st.status = SessionStatus::Stopped;
            st.clear_timeout_state();
        }
        self.publish();
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn handle_event(&mut self, event: RecognitionEvent, now: Instant) {
        let (adopted, listening) = {
            let mut guard = lock_state(&self.state);
            let st: &mut SessionState = &mut guard;
            let listening = st.status.is_listening();
            let adopted = match &event {
                RecognitionEvent::Final(text) => {
                    st.progress.apply_final(text, st.script.units(), &self.params)
                }
                RecognitionEvent::Interim(text) if listening => {
                    st.progress.apply_interim(text, st.script.units(), &self.params)
                }
                RecognitionEvent::Interim(_) => None,
            };
            if adopted.is_some() && listening {
                st.mark_progress(now);
            }
            (adopted, listening)
        };

        let Some(position) = adopted else {
            log::trace!("session: ignored {event:?}");
            return;
        };
        log::debug!(
            "session: {} → {position:?}",
            if event.is_final() { "final" } else { "interim" }
        );
        if listening {
            if let Some(watchdog) = self.watchdog.as_mut() {
                watchdog.record_progress(now);
            }
        }
        self.publish();
    }

    /// Returns the outcome when the command ends the run.
    fn handle_command(&mut self, command: SessionCommand, now: Instant) -> Option<SessionOutcome> {
        log::debug!("session: command {command:?}");
        match command {
            SessionCommand::Start => {
                if !lock_state(&self.state).status.is_listening() {
                    self.start(now);
                }
                return None;
            }
            SessionCommand::Stop => return Some(SessionOutcome::Stopped),
            SessionCommand::ExtendTimeout => {
                if let Some(watchdog) = self.watchdog.as_mut() {
                    watchdog.extend(now);
                }
                let mut st = lock_state(&self.state);
                if st.status.is_listening() {
                    st.mark_progress(now);
                }
            }
            SessionCommand::SetContent(text) => {
                self.persist(Some(&text));
                lock_state(&self.state).set_content(text);
            }
            SessionCommand::ClearContent => {
                self.persist(None);
                lock_state(&self.state).clear_content();
            }
            SessionCommand::ToggleQuickEdit => {
                self.leave_listening();
                lock_state(&self.state).toggle_quick_edit();
            }
            SessionCommand::ToggleEditor => {
                self.leave_listening();
                lock_state(&self.state).toggle_editor();
            }
            SessionCommand::JumpTo(index) => {
                let listening = {
                    let mut guard = lock_state(&self.state);
                    let st: &mut SessionState = &mut guard;
                    let position = st.progress.jump_to(index, st.script.units());
                    log::debug!("session: jumped to {position:?}");
                    let listening = st.status.is_listening();
                    if listening {
                        st.mark_progress(now);
                    }
                    listening
                };
                if listening {
                    if let Some(watchdog) = self.watchdog.as_mut() {
                        watchdog.record_progress(now);
                    }
                }
            }
        }
        self.publish();
        None
    }

    /// Edit modes pause following; `Start` resumes from the kept positions.
    fn leave_listening(&mut self) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.disarm();
        }
        lock_state(&self.state).clear_timeout_state();
    }

    /// Returns `true` when the watchdog expired.
    fn handle_tick(&mut self, now: Instant) -> bool {
        let Some(watchdog) = self.watchdog.as_mut() else {
            return false;
        };
        match watchdog.poll(now) {
            WatchdogEvent::Quiet => false,
            WatchdogEvent::WarningStarted(remaining) | WatchdogEvent::Countdown(remaining) => {
                {
                    let mut st = lock_state(&self.state);
                    st.show_timeout_warning = true;
                    st.timeout_countdown = Some(remaining);
                }
                log::debug!("session: no progress, stopping in {remaining}s");
                self.publish();
                false
            }
            WatchdogEvent::Expired => {
                log::warn!("session: no progress, stopping");
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Save (`Some`) or forget (`None`) the script on disk.
    fn persist(&self, text: Option<&str>) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if !lock_state(&self.state).config.script.persist {
            return;
        }
        let result = match text {
            Some(text) => store.save(text),
            None => store.clear(),
        };
        if let Err(e) = result {
            log::warn!("session: could not update {}: {e}", store.path().display());
        }
    }

    fn publish(&self) {
        let snapshot = lock_state(&self.state).snapshot();
        self.updates.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

/// Wall-clock instant on the tokio clock, so paused-time tests drive the
/// watchdog too.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
