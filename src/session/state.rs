//! Session state machine and shared prompter state.
//!
//! [`SessionStatus`] is the prompter mode.  [`SessionState`] is the single
//! source of truth the rendering layer reads: the script, both progress
//! positions, the timeout warning and the display settings.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>`, cheap to
//! clone and safe to share across threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde::Serialize;

use crate::config::{AppConfig, DisplayConfig};
use crate::matcher::to_wire;
use crate::progress::{ProgressTracker, RenderedScript};
use crate::script::Script;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Prompter modes.
///
/// ```text
/// Stopped ──start──▶ Started ──stop / timeout──▶ Stopped
/// Stopped ◀──toggle_quick_edit──▶ Editing
/// Stopped ◀──toggle_editor──────▶ EditorMode
/// ```
///
/// Entering or leaving either edit mode re-tokenizes the script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Script shown, recognition results not followed.
    #[default]
    Stopped,
    /// Following the speaker.
    Started,
    /// Inline quick-edit of the script.
    Editing,
    /// Full editor with the editor display preset.
    EditorMode,
}

impl SessionStatus {
    /// Returns `true` while interim results should move the display.
    ///
    /// ```
    /// use voice_prompter::session::SessionStatus;
    ///
    /// assert!(SessionStatus::Started.is_listening());
    /// assert!(!SessionStatus::Stopped.is_listening());
    /// assert!(!SessionStatus::Editing.is_listening());
    /// ```
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionStatus::Started)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, SessionStatus::Editing | SessionStatus::EditorMode)
    }

    /// A short human-readable label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Stopped => "Stopped",
            SessionStatus::Started => "Listening",
            SessionStatus::Editing => "Editing",
            SessionStatus::EditorMode => "Editor",
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressSnapshot
// ---------------------------------------------------------------------------

/// Serializable view of the session published after every change.
///
/// Positions use the signed wire form (`-1` = no progress).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub status: SessionStatus,
    pub final_index: i64,
    pub interim_index: i64,
    pub show_timeout_warning: bool,
    pub timeout_countdown: Option<u32>,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Shared prompter state.
///
/// Held behind [`SharedState`].  The session runner is the only writer
/// while a session is running.
pub struct SessionState {
    /// Current prompter mode.
    pub status: SessionStatus,

    /// The loaded script and its units.
    pub script: Script,

    /// Final / interim positions into `script.units()`.
    pub progress: ProgressTracker,

    /// Whether the "no progress" warning is showing.
    pub show_timeout_warning: bool,

    /// Seconds left on the warning countdown.
    pub timeout_countdown: Option<u32>,

    /// When progress was last adopted.  `None` while stopped.
    pub last_progress: Option<Instant>,

    /// Active display settings.
    pub display: DisplayConfig,

    /// Display settings to restore when the editor closes.
    saved_display: Option<DisplayConfig>,

    /// Configuration snapshot.
    pub config: AppConfig,
}

impl SessionState {
    pub fn new(config: AppConfig, script: Script) -> Self {
        Self {
            status: SessionStatus::Stopped,
            script,
            progress: ProgressTracker::new(config.matcher.promote_interim),
            show_timeout_warning: false,
            timeout_countdown: None,
            last_progress: None,
            display: config.display.clone(),
            saved_display: None,
            config,
        }
    }

    /// Replace the script wholesale; progress starts over.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.script.replace(text);
        self.progress.reset();
    }

    /// Show the placeholder again; progress starts over.
    pub fn clear_content(&mut self) {
        let placeholder = self.config.script.placeholder.clone();
        self.script.replace(placeholder);
        self.progress.reset();
    }

    pub fn toggle_quick_edit(&mut self) {
        self.status = if self.status == SessionStatus::Editing {
            SessionStatus::Stopped
        } else {
            SessionStatus::Editing
        };
        self.script.retokenize();
    }

    /// Open or close the full editor, swapping the display preset.
    pub fn toggle_editor(&mut self) {
        if self.status == SessionStatus::EditorMode {
            if let Some(saved) = self.saved_display.take() {
                self.display = saved;
            }
            self.status = SessionStatus::Stopped;
        } else {
            let editor = self.display.editor_preset();
            self.saved_display = Some(std::mem::replace(&mut self.display, editor));
            self.status = SessionStatus::EditorMode;
        }
        self.script.retokenize();
    }

    /// Progress was adopted at `now`: clears any timeout warning.
    pub fn mark_progress(&mut self, now: Instant) {
        self.last_progress = Some(now);
        self.show_timeout_warning = false;
        self.timeout_countdown = None;
    }

    pub fn clear_timeout_state(&mut self) {
        self.show_timeout_warning = false;
        self.timeout_countdown = None;
        self.last_progress = None;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            status: self.status,
            final_index: to_wire(self.progress.final_index()),
            interim_index: to_wire(self.progress.interim_index()),
            show_timeout_warning: self.show_timeout_warning,
            timeout_countdown: self.timeout_countdown,
        }
    }

    pub fn render(&self) -> RenderedScript {
        self.progress.render(self.script.units())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(AppConfig::default(), Script::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock with [`lock_state`] for a short critical section; do **not** hold
/// the lock across `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`].
pub fn new_shared_state(config: AppConfig, script: Script) -> SharedState {
    Arc::new(Mutex::new(SessionState::new(config, script)))
}

/// Lock `state`, recovering the data if a previous holder panicked.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
