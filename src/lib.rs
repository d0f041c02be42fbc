//! Voice-following teleprompter engine.
//!
//! Turns a script into lossless [`script::TextUnit`]s, aligns noisy speech
//! recognition transcripts against them and tracks how far the speaker has
//! read.
//!
//! ```text
//! script text ──tokenize──▶ units ─┐
//!                                  ▼
//! Recognizer ──events──▶ PromptSession ──align──▶ ProgressTracker ──▶ snapshot
//!                              ▲
//!                  InactivityWatchdog (1 s tick)
//! ```
//!
//! * [`script`]: tokenizer, [`script::Script`] and on-disk persistence.
//! * [`matcher`]: windowed, miss-tolerant alignment.
//! * [`progress`]: final / interim positions and the inactivity watchdog.
//! * [`recognition`]: the recognizer boundary and line / scripted sources.
//! * [`session`]: shared state and the async session loop.
//! * [`config`]: TOML settings and platform paths.

pub mod config;
pub mod matcher;
pub mod progress;
pub mod recognition;
pub mod script;
pub mod session;
