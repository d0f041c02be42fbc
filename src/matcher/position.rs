//! Progress positions and their signed wire form.

/// A unit index into the tokenized script, or `None` before any progress.
///
/// `None` orders before every `Some(_)`, so `max` and `>=` work directly on
/// positions.
pub type Position = Option<usize>;

/// Wire value of the "no progress yet" sentinel.
pub const NO_PROGRESS: i64 = -1;

/// Encode a position as a signed integer (`-1` for `None`).
///
/// ```
/// use voice_prompter::matcher::{to_wire, NO_PROGRESS};
///
/// assert_eq!(to_wire(None), NO_PROGRESS);
/// assert_eq!(to_wire(Some(7)), 7);
/// ```
pub fn to_wire(position: Position) -> i64 {
    match position {
        Some(index) => i64::try_from(index).unwrap_or(i64::MAX),
        None => NO_PROGRESS,
    }
}

/// Decode a signed position.  Every negative value means "no progress".
pub fn from_wire(value: i64) -> Position {
    usize::try_from(value).ok()
}
