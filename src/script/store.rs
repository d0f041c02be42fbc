//! On-disk copy of the last loaded script.
//!
//! The prompter reopens with whatever was on screen last time.  The text is
//! stored verbatim as `script.txt` next to `settings.toml`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::AppPaths;

/// Loads, saves and forgets the persisted script text.
#[derive(Debug, Clone)]
pub struct ScriptStore {
    path: PathBuf,
}

impl ScriptStore {
    /// Store backed by the platform config directory.
    pub fn new() -> Self {
        Self::at(AppPaths::new().script_file)
    }

    /// Store backed by an explicit file (useful for tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved script, or `None` when nothing (or only an empty file) is
    /// stored.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// The saved script, falling back to `placeholder`.
    ///
    /// Read errors are logged, not returned: a broken file must not keep the
    /// prompter from starting.
    pub fn load_or_placeholder(&self, placeholder: &str) -> String {
        match self.load() {
            Ok(Some(text)) => text,
            Ok(None) => placeholder.to_string(),
            Err(e) => {
                log::warn!(
                    "script store: failed to read {} ({e}); using placeholder",
                    self.path.display()
                );
                placeholder.to_string()
            }
        }
    }

    /// Persist `text`, creating parent directories as needed.
    pub fn save(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Forget the saved script.  Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::PLACEHOLDER_TEXT;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().expect("temp dir");
        let store = ScriptStore::at(dir.path().join("script.txt"));
        assert_eq!(store.load().expect("load"), None);
        assert_eq!(store.load_or_placeholder(PLACEHOLDER_TEXT), PLACEHOLDER_TEXT);
    }

    #[test]
    fn saved_script_wins_over_placeholder() {
        let dir = tempdir().expect("temp dir");
        let store = ScriptStore::at(dir.path().join("script.txt"));
        store.save("Good evening.").expect("save");
        assert_eq!(store.load_or_placeholder("unused"), "Good evening.");
    }

    #[test]
    fn save_then_load_returns_text_verbatim() {
        let dir = tempdir().expect("temp dir");
        let store = ScriptStore::at(dir.path().join("nested").join("script.txt"));
        let text = "Line one\r\n\nLine two  \n";
        store.save(text).expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some(text));
    }

    #[test]
    fn clear_removes_saved_script() {
        let dir = tempdir().expect("temp dir");
        let store = ScriptStore::at(dir.path().join("script.txt"));
        store.save("something").expect("save");
        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
        // Clearing twice is fine.
        store.clear().expect("clear again");
    }

    #[test]
    fn empty_file_counts_as_nothing_saved() {
        let dir = tempdir().expect("temp dir");
        let store = ScriptStore::at(dir.path().join("script.txt"));
        store.save("").expect("save");
        assert_eq!(store.load().expect("load"), None);
    }
}
