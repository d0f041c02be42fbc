//! Speech-to-script alignment.
//!
//! Given a recognized transcript, the tokenized script and the last confirmed
//! position, [`align`] finds how far into the script the speaker has read.
//! It is a pure function: the caller owns every position and threads it
//! through successive calls (see [`crate::progress::ProgressTracker`]).
//!
//! # Quick start
//!
//! ```rust
//! use voice_prompter::matcher::{align, AlignParams};
//! use voice_prompter::script::tokenize;
//!
//! let units = tokenize("Good evening, and welcome to the show.");
//! let params = AlignParams::default();
//!
//! let pos = align("good evening and", &units, None, &params);
//! let pos = align("welcome to the", &units, pos, &params);
//! assert_eq!(units[pos.unwrap() - 1].value, "the");
//! ```

pub mod aligner;
pub mod position;

pub use aligner::{align, compute_progress_index, AlignParams};
pub use position::{from_wire, to_wire, Position, NO_PROGRESS};
