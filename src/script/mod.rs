//! Prompter script model: raw text, its tokenized units, and persistence.
//!
//! * [`tokenize`]: lossless word-boundary tokenizer producing [`TextUnit`]s.
//! * [`Script`]: the raw text paired with its current unit sequence.
//! * [`ScriptStore`]: keeps the last loaded script on disk between runs.
//!
//! # Quick start
//!
//! ```rust
//! use voice_prompter::script::Script;
//!
//! let script = Script::new("Good evening.\nTonight's top story...");
//! assert_eq!(script.units()[0].value, "Good");
//! assert_eq!(script.word_count(), 5);
//! ```

pub mod store;
pub mod tokenizer;

pub use store::ScriptStore;
pub use tokenizer::{normalize_words, reconstruct, tokenize, TextUnit, UnitKind};

/// Text shown before the user has loaded anything.
pub const PLACEHOLDER_TEXT: &str = "Click on the Editor button and paste your content here...";

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Raw script text together with the units derived from it.
///
/// The text is replaced wholesale on edit; the units are re-derived every
/// time via [`Script::retokenize`] or [`Script::replace`].
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    raw_text: String,
    units: Vec<TextUnit>,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        let raw_text = text.into();
        let units = tokenize(&raw_text);
        Self { raw_text, units }
    }

    /// The placeholder script used on first launch and after a clear.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TEXT)
    }

    pub fn text(&self) -> &str {
        &self.raw_text
    }

    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    /// Replace the text and re-derive the units.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
        self.retokenize();
    }

    /// Discard the current units and tokenize the raw text again.
    pub fn retokenize(&mut self) {
        self.units = tokenize(&self.raw_text);
        log::debug!("script: retokenized into {} units", self.units.len());
    }

    /// Number of units with a non-empty comparison key.
    pub fn word_count(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.is_word() && !unit.key().is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::placeholder()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
