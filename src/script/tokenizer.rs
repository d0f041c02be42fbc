//! Word-boundary tokenizer for prompter scripts.
//!
//! [`tokenize`] splits a script into alternating runs of word characters and
//! separator characters (whitespace, punctuation, line breaks).  Every
//! character of the input lands in exactly one [`TextUnit`], so
//! [`reconstruct`] gives back the original text byte for byte.
//!
//! ```text
//! "Hello, world!\n"
//!   → [0] Word      "Hello"   key "hello"
//!     [1] Separator ", "
//!     [2] Word      "world"   key "world"
//!     [3] Separator "!\n"
//! ```

use serde::Serialize;

// ---------------------------------------------------------------------------
// UnitKind
// ---------------------------------------------------------------------------

/// Whether a [`TextUnit`] takes part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A run of word characters.  Matched against recognized speech.
    Word,
    /// A run of whitespace / punctuation kept only for display.
    Separator,
}

// ---------------------------------------------------------------------------
// TextUnit
// ---------------------------------------------------------------------------

/// One matchable (or separator) piece of a tokenized script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextUnit {
    /// Zero-based ordinal of this unit in the sequence.
    pub index: usize,
    /// The literal substring covered by this unit.
    pub value: String,
    /// Word or separator.
    pub kind: UnitKind,
    #[serde(skip)]
    key: String,
}

impl TextUnit {
    fn new(index: usize, value: &str, kind: UnitKind) -> Self {
        let key = match kind {
            UnitKind::Word => comparison_key(value),
            UnitKind::Separator => String::new(),
        };
        Self {
            index,
            value: value.to_string(),
            kind,
            key,
        }
    }

    /// Case-folded, punctuation-free key used for matching.
    ///
    /// Empty for separators and for words made only of `_`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_word(&self) -> bool {
        self.kind == UnitKind::Word
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split `text` into word and separator units.
///
/// Total over all inputs; the empty string yields an empty vector.
///
/// ```
/// use voice_prompter::script::{reconstruct, tokenize};
///
/// let units = tokenize("the quick brown fox");
/// assert_eq!(units.len(), 7);
/// assert_eq!(units[4].value, "brown");
/// assert_eq!(reconstruct(&units), "the quick brown fox");
/// ```
pub fn tokenize(text: &str) -> Vec<TextUnit> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut units = Vec::new();
    let mut run_start = 0usize;
    let mut run_kind: Option<UnitKind> = None;

    for pos in 0..chars.len() {
        let kind = classify(&chars, pos);
        match run_kind {
            Some(current) if current == kind => {}
            Some(current) => {
                let offset = chars[pos].0;
                units.push(TextUnit::new(units.len(), &text[run_start..offset], current));
                run_start = offset;
                run_kind = Some(kind);
            }
            None => run_kind = Some(kind),
        }
    }

    if let Some(current) = run_kind {
        units.push(TextUnit::new(units.len(), &text[run_start..], current));
    }

    units
}

/// Comparison keys of the words in `text`, in order.
///
/// Applies the same normalization as [`TextUnit::key`], so a recognizer
/// transcript can be compared word by word against script units.
///
/// ```
/// use voice_prompter::script::normalize_words;
///
/// assert_eq!(normalize_words("Don't STOP, now!"), vec!["dont", "stop", "now"]);
/// ```
pub fn normalize_words(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|unit| unit.is_word() && !unit.key.is_empty())
        .map(|unit| unit.key)
        .collect()
}

/// Concatenate unit values in order.
pub fn reconstruct(units: &[TextUnit]) -> String {
    units.iter().map(|unit| unit.value.as_str()).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// An apostrophe between two alphanumerics ("don't") stays inside the word.
fn classify(chars: &[(usize, char)], pos: usize) -> UnitKind {
    let c = chars[pos].1;
    if is_word_char(c) {
        return UnitKind::Word;
    }
    if is_apostrophe(c) {
        let before = pos
            .checked_sub(1)
            .is_some_and(|prev| chars[prev].1.is_alphanumeric());
        let after = chars
            .get(pos + 1)
            .is_some_and(|&(_, next)| next.is_alphanumeric());
        if before && after {
            return UnitKind::Word;
        }
    }
    UnitKind::Separator
}

fn comparison_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
