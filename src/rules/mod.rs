//! Game rules.
//!
//! Pure transition functions over an owned `Session`:
//! - How a guess is judged
//! - How a draw or a guess changes the session
//! - When the session has to end
//!
//! The controller sequences network calls and feeds their results
//! through these functions; it never edits counters directly.

pub mod engine;

pub use engine::{
    apply_draw, apply_guess, begin_session, end_session, judge, Direction, Draw, Outcome, Step,
};
