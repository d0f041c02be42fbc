//! Caller-side final / interim position bookkeeping.
//!
//! The matcher never clamps against interim state; these rules live here:
//!
//! | Event   | Computed from | Adopted when            | Effect                                  |
//! |---------|---------------|-------------------------|-----------------------------------------|
//! | final   | `final_index` | `computed >= final`     | `final = max(computed, interim)`¹       |
//! | interim | `final_index` | `computed > final`      | `interim = computed`                    |
//!
//! ¹ only with `promote_interim`; otherwise `final = computed`.  In both
//! cases `interim` is raised to at least `final`.

use serde::Serialize;

use crate::matcher::{align, AlignParams, Position};
use crate::script::TextUnit;

// ---------------------------------------------------------------------------
// UnitStatus
// ---------------------------------------------------------------------------

/// How the rendering layer should show a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    /// At or before the final position.
    Confirmed,
    /// Past the final position, at or before the interim position.
    Provisional,
    /// Not reached yet.
    Pending,
}

// ---------------------------------------------------------------------------
// RenderedScript
// ---------------------------------------------------------------------------

/// The script text split by [`UnitStatus`], ready for display.
///
/// `confirmed + provisional + pending` is always the full script text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedScript {
    pub confirmed: String,
    pub provisional: String,
    pub pending: String,
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

/// Holds the confirmed (`final`) and provisional (`interim`) positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    final_index: Position,
    interim_index: Position,
    promote_interim: bool,
}

impl ProgressTracker {
    pub fn new(promote_interim: bool) -> Self {
        Self {
            final_index: None,
            interim_index: None,
            promote_interim,
        }
    }

    pub fn final_index(&self) -> Position {
        self.final_index
    }

    pub fn interim_index(&self) -> Position {
        self.interim_index
    }

    /// Back to "no progress" (session start, content change, clear).
    pub fn reset(&mut self) {
        self.final_index = None;
        self.interim_index = None;
    }

    /// Apply a final transcript.
    ///
    /// Returns the new final position when it was adopted, `None` otherwise.
    /// An adopted position may equal the previous one: a final result that
    /// re-confirms already-read words still counts as activity.
    pub fn apply_final(
        &mut self,
        transcript: &str,
        units: &[TextUnit],
        params: &AlignParams,
    ) -> Option<Position> {
        let computed = align(transcript, units, self.final_index, params);
        if computed < self.final_index {
            return None;
        }

        self.final_index = if self.promote_interim {
            computed.max(self.interim_index)
        } else {
            computed
        };
        self.interim_index = self.interim_index.max(self.final_index);
        Some(self.final_index)
    }

    /// Apply an interim transcript.
    ///
    /// Returns the new interim position when it moved past the final one.
    pub fn apply_interim(
        &mut self,
        transcript: &str,
        units: &[TextUnit],
        params: &AlignParams,
    ) -> Option<Position> {
        let computed = align(transcript, units, self.final_index, params);
        if computed <= self.final_index {
            return None;
        }
        self.interim_index = computed;
        Some(computed)
    }

    /// Put both positions on `unit_index` (clamped to the last unit).
    ///
    /// The only way to move backward.  An empty script resets instead.
    pub fn jump_to(&mut self, unit_index: usize, units: &[TextUnit]) -> Position {
        let Some(last_unit) = units.len().checked_sub(1) else {
            self.reset();
            return None;
        };
        let position = Some(unit_index.min(last_unit));
        self.final_index = position;
        self.interim_index = position;
        position
    }

    /// Classify `unit_index` for display.
    pub fn status_of(&self, unit_index: usize) -> UnitStatus {
        let position = Some(unit_index);
        if position <= self.final_index {
            UnitStatus::Confirmed
        } else if position <= self.interim_index {
            UnitStatus::Provisional
        } else {
            UnitStatus::Pending
        }
    }

    /// Split `units` into confirmed / provisional / pending text.
    pub fn render(&self, units: &[TextUnit]) -> RenderedScript {
        let mut rendered = RenderedScript::default();
        for unit in units {
            let target = match self.status_of(unit.index) {
                UnitStatus::Confirmed => &mut rendered.confirmed,
                UnitStatus::Provisional => &mut rendered.provisional,
                UnitStatus::Pending => &mut rendered.pending,
            };
            target.push_str(&unit.value);
        }
        rendered
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::tokenize;

    const FOX: &str = "the quick brown fox jumps over the lazy dog";

    fn params() -> AlignParams {
        AlignParams::default()
    }

    #[test]
    fn starts_without_progress() {
        let tracker = ProgressTracker::default();
        assert_eq!(tracker.final_index(), None);
        assert_eq!(tracker.interim_index(), None);
        assert_eq!(tracker.status_of(0), UnitStatus::Pending);
    }

    #[test]
    fn interim_advances_only_past_final() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();

        assert_eq!(tracker.apply_interim("the quick", &units, &params()), Some(Some(3)));
        assert_eq!(tracker.interim_index(), Some(3));
        assert_eq!(tracker.final_index(), None);

        // Noise: no match, interim untouched.
        assert_eq!(tracker.apply_interim("xyzzy", &units, &params()), None);
        assert_eq!(tracker.interim_index(), Some(3));
    }

    #[test]
    fn interim_may_fluctuate_between_calls() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_interim("the quick brown fox", &units, &params());
        assert_eq!(tracker.interim_index(), Some(7));
        // The recognizer revised its hypothesis to something shorter.
        tracker.apply_interim("the quick", &units, &params());
        assert_eq!(tracker.interim_index(), Some(3));
    }

    #[test]
    fn final_promotes_pending_interim() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_interim("the quick brown fox", &units, &params());
        let adopted = tracker.apply_final("the quick brown", &units, &params());
        assert_eq!(adopted, Some(Some(7)));
        assert_eq!(tracker.final_index(), Some(7));
        assert_eq!(tracker.interim_index(), Some(7));
    }

    #[test]
    fn final_without_promotion_keeps_computed_index() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::new(false);
        tracker.apply_interim("the quick brown fox", &units, &params());
        tracker.apply_final("the quick brown", &units, &params());
        assert_eq!(tracker.final_index(), Some(5));
        assert_eq!(tracker.interim_index(), Some(7));
    }

    #[test]
    fn final_never_regresses() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::new(false);
        let events = [
            "the quick brown",
            "quick",
            "xyzzy",
            "fox jumps",
            "",
            "the quick",
            "over the lazy dog",
        ];
        let mut previous = tracker.final_index();
        for event in events {
            tracker.apply_final(event, &units, &params());
            assert!(tracker.final_index() >= previous, "regressed on {event:?}");
            previous = tracker.final_index();
        }
        assert_eq!(tracker.final_index(), Some(16));
    }

    #[test]
    fn interim_never_behind_final() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::new(false);
        let events = [
            (false, "the quick"),
            (true, "the quick brown fox"),
            (false, "jumps"),
            (false, "zzz"),
            (true, "jumps over"),
            (false, "the"),
        ];
        for (is_final, text) in events {
            if is_final {
                tracker.apply_final(text, &units, &params());
            } else {
                tracker.apply_interim(text, &units, &params());
            }
            assert!(tracker.interim_index() >= tracker.final_index(), "after {text:?}");
        }
    }

    #[test]
    fn unchanged_final_is_still_adopted() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_final("the quick", &units, &params());
        assert_eq!(tracker.apply_final("zzz", &units, &params()), Some(Some(3)));
    }

    #[test]
    fn status_partitions_units() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_final("the quick", &units, &params());
        tracker.apply_interim("the quick brown fox", &units, &params());

        assert_eq!(tracker.status_of(0), UnitStatus::Confirmed);
        assert_eq!(tracker.status_of(3), UnitStatus::Confirmed);
        assert_eq!(tracker.status_of(4), UnitStatus::Provisional);
        assert_eq!(tracker.status_of(7), UnitStatus::Provisional);
        assert_eq!(tracker.status_of(8), UnitStatus::Pending);
    }

    #[test]
    fn render_splits_text_by_status() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_final("the quick", &units, &params());
        tracker.apply_interim("the quick brown fox", &units, &params());

        let rendered = tracker.render(&units);
        assert_eq!(rendered.confirmed, "the quick ");
        assert_eq!(rendered.provisional, "brown fox ");
        assert_eq!(rendered.pending, "jumps over the lazy dog");
    }

    #[test]
    fn render_without_progress_is_all_pending() {
        let units = tokenize(FOX);
        let rendered = ProgressTracker::default().render(&units);
        assert!(rendered.confirmed.is_empty());
        assert!(rendered.provisional.is_empty());
        assert_eq!(rendered.pending, FOX);
    }

    #[test]
    fn jump_to_moves_backward() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_final("the quick brown fox jumps over", &units, &params());
        assert_eq!(tracker.final_index(), Some(11));

        assert_eq!(tracker.jump_to(2, &units), Some(2));
        assert_eq!(tracker.final_index(), Some(2));
        assert_eq!(tracker.interim_index(), Some(2));

        // Reading continues from the new spot.
        tracker.apply_final("brown fox", &units, &params());
        assert_eq!(tracker.final_index(), Some(7));
    }

    #[test]
    fn jump_to_clamps_to_last_unit() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.jump_to(500, &units), Some(16));
        assert_eq!(tracker.interim_index(), Some(16));
    }

    #[test]
    fn jump_to_on_empty_script_resets() {
        let mut tracker = ProgressTracker::default();
        tracker.jump_to(3, &tokenize(FOX));
        assert_eq!(tracker.jump_to(3, &[]), None);
        assert_eq!(tracker.final_index(), None);
        assert_eq!(tracker.interim_index(), None);
    }

    #[test]
    fn reset_returns_to_sentinel() {
        let units = tokenize(FOX);
        let mut tracker = ProgressTracker::default();
        tracker.apply_final("the quick brown", &units, &params());
        tracker.reset();
        assert_eq!(tracker.final_index(), None);
        assert_eq!(tracker.interim_index(), None);
    }
}
