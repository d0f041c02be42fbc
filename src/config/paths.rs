//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir (settings + last script):
//!   Windows: %APPDATA%\voice-prompter\
//!   macOS:   ~/Library/Application Support/voice-prompter/
//!   Linux:   ~/.config/voice-prompter/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `script.txt`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `script.txt`, the last loaded script.
    pub script_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-prompter";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self::in_dir(config_dir)
    }

    /// Lay the files out under an explicit directory.
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let settings_file = config_dir.join("settings.toml");
        let script_file = config_dir.join("script.txt");

        Self {
            config_dir,
            settings_file,
            script_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
