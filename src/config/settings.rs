//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every field is `#[serde(default)]`-backed, so older or hand-trimmed files
//! still load.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::matcher::AlignParams;
use crate::script::PLACEHOLDER_TEXT;

// ---------------------------------------------------------------------------
// MatcherConfig
// ---------------------------------------------------------------------------

/// Tunables for speech-to-script alignment.
///
/// Mirrors [`AlignParams`] plus the caller-side interim promotion rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Already-confirmed words re-searched behind the current position.
    pub lookbehind: usize,
    /// Forward window length as a multiple of the spoken word count.
    pub window_multiplier: usize,
    /// Minimum forward window length in words.
    pub min_window: usize,
    /// Skipped / substituted words tolerated inside one matched run.
    pub max_misses: usize,
    /// Shortest run (in exact matches) that may move the position.
    pub min_matched_words: usize,
    /// Confirm provisional words when a final result arrives.
    pub promote_interim: bool,
}

impl MatcherConfig {
    pub fn align_params(&self) -> AlignParams {
        AlignParams {
            lookbehind: self.lookbehind,
            window_multiplier: self.window_multiplier,
            min_window: self.min_window,
            max_misses: self.max_misses,
            min_matched_words: self.min_matched_words,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        let params = AlignParams::default();
        Self {
            lookbehind: params.lookbehind,
            window_multiplier: params.window_multiplier,
            min_window: params.min_window,
            max_misses: params.max_misses,
            min_matched_words: params.min_matched_words,
            promote_interim: true,
        }
    }
}

// ---------------------------------------------------------------------------
// WatchdogConfig
// ---------------------------------------------------------------------------

/// Settings for the inactivity watchdog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Stop stalled sessions at all.
    pub enabled: bool,
    /// Seconds without progress before the warning appears.
    pub inactivity_secs: u64,
    /// Length of the warning countdown in seconds.
    pub warning_secs: u32,
}

impl WatchdogConfig {
    pub fn inactivity(&self) -> Duration {
        Duration::from_secs(self.inactivity_secs)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            inactivity_secs: 15,
            warning_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Prompter display settings.
///
/// Only carried and persisted here; the rendering layer interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Font size in pixels.
    pub font_size: u32,
    /// Horizontal margin in pixels.
    pub margin: u32,
    /// Text opacity in percent.
    pub opacity: u32,
    /// Vertical position of the reading line, percent from the top.
    pub read_line_position: u32,
    /// Mirror horizontally (for beam-splitter glass).
    pub horizontally_flipped: bool,
    /// Mirror vertically.
    pub vertically_flipped: bool,
}

impl DisplayConfig {
    /// Layout used while the full-screen editor is open.  Keeps the flip and
    /// opacity settings of `self`.
    pub fn editor_preset(&self) -> Self {
        Self {
            font_size: 25,
            margin: 370,
            read_line_position: 10,
            ..self.clone()
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            font_size: 80,
            margin: 290,
            opacity: 100,
            read_line_position: 90,
            horizontally_flipped: false,
            vertically_flipped: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptConfig
// ---------------------------------------------------------------------------

/// Script loading / persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Keep the last script on disk and reopen it on the next launch.
    pub persist: bool,
    /// Text shown when no script is loaded.
    pub placeholder: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            persist: true,
            placeholder: PLACEHOLDER_TEXT.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_prompter::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Alignment tunables.
    pub matcher: MatcherConfig,
    /// Inactivity watchdog.
    pub watchdog: WatchdogConfig,
    /// Display settings.
    pub display: DisplayConfig,
    /// Script handling.
    pub script: ScriptConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` survives a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.matcher.lookbehind, 2);
        assert_eq!(cfg.matcher.window_multiplier, 4);
        assert_eq!(cfg.matcher.min_window, 12);
        assert_eq!(cfg.matcher.max_misses, 2);
        assert_eq!(cfg.matcher.min_matched_words, 1);
        assert!(cfg.matcher.promote_interim);
        assert!(cfg.watchdog.enabled);
        assert_eq!(cfg.watchdog.inactivity(), Duration::from_secs(15));
        assert_eq!(cfg.watchdog.warning_secs, 5);
        assert_eq!(cfg.display.font_size, 80);
        assert_eq!(cfg.display.margin, 290);
        assert_eq!(cfg.display.read_line_position, 90);
        assert!(cfg.script.persist);
        assert_eq!(cfg.script.placeholder, PLACEHOLDER_TEXT);
    }

    #[test]
    fn matcher_config_maps_onto_align_params() {
        assert_eq!(MatcherConfig::default().align_params(), AlignParams::default());

        let cfg = MatcherConfig {
            max_misses: 0,
            min_window: 30,
            ..MatcherConfig::default()
        };
        let params = cfg.align_params();
        assert_eq!(params.max_misses, 0);
        assert_eq!(params.min_window, 30);
    }

    #[test]
    fn editor_preset_keeps_flip_and_opacity() {
        let display = DisplayConfig {
            opacity: 60,
            horizontally_flipped: true,
            ..DisplayConfig::default()
        };
        let editor = display.editor_preset();
        assert_eq!(editor.font_size, 25);
        assert_eq!(editor.margin, 370);
        assert_eq!(editor.read_line_position, 10);
        assert_eq!(editor.opacity, 60);
        assert!(editor.horizontally_flipped);
    }

    /// Non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.matcher.max_misses = 1;
        cfg.matcher.promote_interim = false;
        cfg.watchdog.inactivity_secs = 30;
        cfg.display.vertically_flipped = true;
        cfg.script.persist = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.matcher.max_misses, 1);
        assert!(!loaded.matcher.promote_interim);
        assert_eq!(loaded.watchdog.inactivity_secs, 30);
        assert!(loaded.display.vertically_flipped);
        assert!(!loaded.script.persist);
    }

    /// Partial files fill the gaps with defaults.
    #[test]
    fn partial_file_uses_defaults_for_missing_fields() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[watchdog]\ninactivity_secs = 45\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.watchdog.inactivity_secs, 45);
        assert_eq!(loaded.watchdog.warning_secs, 5);
        assert_eq!(loaded.matcher, MatcherConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "matcher = [not toml").expect("write");
        assert!(AppConfig::load_from(&path).is_err());
    }
}
