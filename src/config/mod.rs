//! Configuration module for the voice prompter.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the matcher,
//! the inactivity watchdog, the display and script handling, `AppPaths` for
//! cross-platform directories, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, DisplayConfig, MatcherConfig, ScriptConfig, WatchdogConfig};
