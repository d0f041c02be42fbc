//! Windowed, noise-tolerant alignment of recognized speech to script units.
//!
//! # Algorithm
//!
//! ```text
//! script words   … quick brown │ fox jumps over the lazy dog …
//!                  ◀lookbehind─┤◀──── max(min_window, k × spoken) ────▶
//!                              ▲
//!                     first word after `last`
//!
//! for every anchor (script word == spoken word) inside the window:
//!     extend an in-order run, tolerating ≤ max_misses skips/substitutions
//! best run = most matches, then fewest misses, then nearest end
//! result   = unit right after the run's last matched word, never < last
//! ```
//!
//! Cost per call is bounded by the window size times the transcript length,
//! independent of how long the script is.

use std::ops::Range;

use crate::script::{normalize_words, TextUnit};

use super::position::Position;

// ---------------------------------------------------------------------------
// AlignParams
// ---------------------------------------------------------------------------

/// Tunables for [`align`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignParams {
    /// Already-confirmed words re-searched before the current position, so a
    /// recognizer repeating the tail of the last utterance still anchors.
    pub lookbehind: usize,
    /// Forward window length as a multiple of the spoken word count.
    pub window_multiplier: usize,
    /// Lower bound on the forward window length, in words.
    pub min_window: usize,
    /// Skipped, extra or substituted words tolerated inside one run.
    pub max_misses: usize,
    /// Runs with fewer exact matches than this are ignored.
    pub min_matched_words: usize,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            lookbehind: 2,
            window_multiplier: 4,
            min_window: 12,
            max_misses: 2,
            min_matched_words: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compute the new progress position with [`AlignParams::default`].
///
/// ```
/// use voice_prompter::matcher::compute_progress_index;
/// use voice_prompter::script::tokenize;
///
/// let units = tokenize("the quick brown fox jumps over the lazy dog");
/// // Unit 5 is the space right after "brown".
/// assert_eq!(compute_progress_index("the quick brown", &units, None), Some(5));
/// assert_eq!(compute_progress_index("", &units, Some(3)), Some(3));
/// ```
pub fn compute_progress_index(transcript: &str, units: &[TextUnit], last: Position) -> Position {
    align(transcript, units, last, &AlignParams::default())
}

/// Compute how far into `units` the speaker has advanced.
///
/// Returns `last` unchanged when the transcript is empty, the script has no
/// words, or nothing in the search window matches.  Never returns a
/// position below `last`.
pub fn align(transcript: &str, units: &[TextUnit], last: Position, params: &AlignParams) -> Position {
    let spoken = normalize_words(transcript);
    if spoken.is_empty() || units.is_empty() {
        return last;
    }

    let words: Vec<ScriptWord<'_>> = units
        .iter()
        .filter(|unit| unit.is_word() && !unit.key().is_empty())
        .map(|unit| ScriptWord {
            key: unit.key(),
            unit_index: unit.index,
        })
        .collect();
    if words.is_empty() {
        return last;
    }

    let window = search_window(&words, last, spoken.len(), params);
    let Some(run) = best_run(&words[window.clone()], &spoken, params) else {
        log::trace!("matcher: no run in window {window:?} for {} words", spoken.len());
        return last;
    };

    let matched = &words[window.start + run.end];
    let next = (matched.unit_index + 1).min(units.len() - 1);
    log::trace!(
        "matcher: {} matched / {} missed, last word unit {} → {next}",
        run.matched,
        run.misses,
        matched.unit_index
    );

    last.max(Some(next))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct ScriptWord<'a> {
    key: &'a str,
    unit_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    /// Exact word matches in the run, anchor included.
    matched: usize,
    /// Misses between the anchor and the last match.
    misses: usize,
    /// Window offset of the last matched script word.
    end: usize,
}

impl Run {
    fn beats(&self, other: &Run) -> bool {
        (self.matched, other.misses, other.end) > (other.matched, self.misses, self.end)
    }
}

/// Word-ordinal range to search, in `words` coordinates.
fn search_window(
    words: &[ScriptWord<'_>],
    last: Position,
    spoken_len: usize,
    params: &AlignParams,
) -> Range<usize> {
    let first_unseen = match last {
        Some(index) => words.partition_point(|word| word.unit_index <= index),
        None => 0,
    };
    let start = first_unseen.saturating_sub(params.lookbehind);
    let span = params
        .min_window
        .max(spoken_len.saturating_mul(params.window_multiplier));
    let end = first_unseen.saturating_add(span).min(words.len());
    start..end
}

fn best_run(window: &[ScriptWord<'_>], spoken: &[String], params: &AlignParams) -> Option<Run> {
    let mut best: Option<Run> = None;

    for (s, word) in window.iter().enumerate() {
        for (t, spoken_word) in spoken.iter().enumerate() {
            if word.key != spoken_word {
                continue;
            }
            let run = extend_run(window, spoken, s, t, params.max_misses);
            if best.map_or(true, |current| run.beats(&current)) {
                best = Some(run);
            }
        }
    }

    best.filter(|run| run.matched >= params.min_matched_words.max(1))
}

/// Greedily extend the anchor `(s, t)` forward through both sequences.
fn extend_run(
    window: &[ScriptWord<'_>],
    spoken: &[String],
    s: usize,
    t: usize,
    max_misses: usize,
) -> Run {
    let mut run = Run {
        matched: 1,
        misses: 0,
        end: s,
    };
    // Misses only count once a later match confirms the run went on.
    let mut pending = 0;
    let (mut i, mut j) = (s + 1, t + 1);

    while i < window.len() && j < spoken.len() {
        if window[i].key == spoken[j] {
            run.matched += 1;
            run.misses += pending;
            pending = 0;
            run.end = i;
            i += 1;
            j += 1;
            continue;
        }

        if run.misses + pending >= max_misses {
            break;
        }
        pending += 1;

        if window.get(i + 1).is_some_and(|next| next.key == spoken[j]) {
            // Speaker skipped a script word.
            i += 1;
        } else if spoken.get(j + 1).is_some_and(|next| next == window[i].key) {
            // Recognizer inserted an extra word.
            j += 1;
        } else {
            // Misrecognized word.
            i += 1;
            j += 1;
        }
    }

    run
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::tokenize;

    const FOX: &str = "the quick brown fox jumps over the lazy dog";

    /// Unit index of the `n`-th word (0-based) in `units`.
    fn word_unit(units: &[TextUnit], n: usize) -> usize {
        units.iter().filter(|u| u.is_word()).nth(n).unwrap().index
    }

    // ---- No-match stability ---

    #[test]
    fn empty_transcript_returns_last() {
        let units = tokenize(FOX);
        assert_eq!(compute_progress_index("", &units, None), None);
        assert_eq!(compute_progress_index("", &units, Some(4)), Some(4));
        assert_eq!(compute_progress_index("  , . ", &units, Some(4)), Some(4));
    }

    #[test]
    fn empty_units_return_last() {
        assert_eq!(compute_progress_index("the quick", &[], None), None);
        assert_eq!(compute_progress_index("the quick", &[], Some(9)), Some(9));
    }

    #[test]
    fn separator_only_script_returns_last() {
        let units = tokenize(" ... \n ");
        assert_eq!(compute_progress_index("anything", &units, None), None);
    }

    #[test]
    fn unmatched_words_return_last() {
        let units = tokenize(FOX);
        assert_eq!(compute_progress_index("xyzzy nonsense", &units, None), None);
        assert_eq!(compute_progress_index("xyzzy nonsense", &units, Some(5)), Some(5));
    }

    // ---- Advancement ---

    #[test]
    fn exact_match_lands_after_last_matched_word() {
        let units = tokenize(FOX);
        let result = compute_progress_index("the quick brown", &units, None);
        assert_eq!(result, Some(5));
        assert_eq!(units[5].value, " ");
        assert_eq!(units[6].value, "fox");
    }

    #[test]
    fn transcript_case_and_punctuation_are_ignored() {
        let units = tokenize(FOX);
        assert_eq!(
            compute_progress_index("The Quick, brown!", &units, None),
            Some(5)
        );
    }

    #[test]
    fn substituted_word_does_not_block_progress() {
        let units = tokenize(FOX);
        let result = compute_progress_index("the quick brow fox", &units, None);
        let after_fox = word_unit(&units, 3) + 1;
        assert!(result >= Some(after_fox), "got {result:?}");
    }

    #[test]
    fn skipped_script_word_is_tolerated() {
        let units = tokenize(FOX);
        // "brown" never spoken.
        let result = compute_progress_index("the quick fox jumps", &units, None);
        assert_eq!(result, Some(word_unit(&units, 4) + 1));
    }

    #[test]
    fn inserted_spoken_word_is_tolerated() {
        let units = tokenize(FOX);
        let result = compute_progress_index("the quick um brown fox", &units, None);
        assert_eq!(result, Some(word_unit(&units, 3) + 1));
    }

    #[test]
    fn continues_from_last_position() {
        let units = tokenize(FOX);
        let last = compute_progress_index("the quick brown", &units, None);
        let next = compute_progress_index("fox jumps", &units, last);
        assert_eq!(next, Some(word_unit(&units, 4) + 1));
    }

    #[test]
    fn small_skip_ahead_is_followed() {
        let units = tokenize(FOX);
        let result = compute_progress_index("over the lazy", &units, None);
        assert_eq!(result, Some(word_unit(&units, 7) + 1));
    }

    #[test]
    fn last_word_of_script_maps_to_itself() {
        let units = tokenize("hello world");
        assert_eq!(compute_progress_index("hello world", &units, None), Some(2));
        let units = tokenize("hello world.");
        assert_eq!(compute_progress_index("hello world", &units, None), Some(3));
    }

    #[test]
    fn reconfirmed_words_never_regress() {
        let units = tokenize(FOX);
        let last = Some(word_unit(&units, 3) + 1); // after "fox"
        assert_eq!(compute_progress_index("quick brown", &units, last), last);
        assert_eq!(compute_progress_index("brown fox", &units, last), last);
    }

    #[test]
    fn repeated_tail_then_new_words_advances() {
        let units = tokenize(FOX);
        let last = Some(word_unit(&units, 2) + 1); // after "brown"
        let result = compute_progress_index("brown fox jumps", &units, last);
        assert_eq!(result, Some(word_unit(&units, 4) + 1));
    }

    // ---- Bounded window ---

    fn long_script() -> String {
        let filler: Vec<String> = (0..40).map(|i| format!("filler{i}")).collect();
        format!("the opening line {} the closing line", filler.join(" "))
    }

    #[test]
    fn common_word_prefers_nearest_occurrence() {
        let units = tokenize(&long_script());
        assert_eq!(
            compute_progress_index("the", &units, None),
            Some(word_unit(&units, 0) + 1)
        );
    }

    #[test]
    fn occurrence_outside_window_is_ignored() {
        let units = tokenize(&long_script());
        // After "line": the next "the" is ~40 words away, beyond the window.
        let last = Some(word_unit(&units, 2) + 1);
        assert_eq!(compute_progress_index("the", &units, last), last);
        assert_eq!(compute_progress_index("the closing line", &units, last), last);
    }

    #[test]
    fn window_grows_with_transcript_length() {
        let script = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma";
        let units = tokenize(script);
        let narrow = AlignParams {
            min_window: 2,
            window_multiplier: 1,
            lookbehind: 0,
            ..AlignParams::default()
        };
        assert_eq!(align("delta", &units, None, &narrow), None);
        // Four spoken words widen the window to four script words.
        assert_eq!(
            align("xx yy zz delta", &units, None, &narrow),
            Some(word_unit(&units, 3) + 1)
        );
    }

    #[test]
    fn nearer_occurrence_wins_after_progress() {
        let text = "the cat sat on the mat and the dog sat on the log";
        let units = tokenize(text);
        let last = Some(word_unit(&units, 2) + 1); // after "sat"
        let result = compute_progress_index("the", &units, last);
        // Nearest forward "the" is word 4, not word 7 or 11.
        assert_eq!(result, Some(word_unit(&units, 4) + 1));
    }

    // ---- Tunables ---

    #[test]
    fn min_matched_words_rejects_short_runs() {
        let units = tokenize(FOX);
        let strict = AlignParams {
            min_matched_words: 2,
            ..AlignParams::default()
        };
        assert_eq!(align("fox", &units, None, &strict), None);
        assert_eq!(
            align("fox jumps", &units, None, &strict),
            Some(word_unit(&units, 4) + 1)
        );
    }

    #[test]
    fn zero_miss_budget_stops_at_first_mismatch() {
        let units = tokenize(FOX);
        let exact = AlignParams {
            max_misses: 0,
            ..AlignParams::default()
        };
        assert_eq!(
            align("the quick brow fox", &units, None, &exact),
            Some(word_unit(&units, 1) + 1)
        );
    }

    #[test]
    fn fewer_misses_breaks_ties() {
        let a = Run { matched: 3, misses: 0, end: 9 };
        let b = Run { matched: 3, misses: 1, end: 2 };
        assert!(a.beats(&b));
        assert!(!b.beats(&a));
    }

    #[test]
    fn nearer_end_breaks_ties() {
        let near = Run { matched: 2, misses: 0, end: 1 };
        let far = Run { matched: 2, misses: 0, end: 8 };
        assert!(near.beats(&far));
        assert!(!far.beats(&near));
    }

    #[test]
    fn more_matches_win() {
        let long = Run { matched: 4, misses: 2, end: 10 };
        let short = Run { matched: 3, misses: 0, end: 0 };
        assert!(long.beats(&short));
    }

    #[test]
    fn align_is_pure() {
        let units = tokenize(FOX);
        let first = compute_progress_index("quick brown", &units, None);
        let second = compute_progress_index("quick brown", &units, None);
        assert_eq!(first, second);
    }
}
