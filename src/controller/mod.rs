//! Session controller: sequences the card service, the rules and the
//! presenter for one player.

mod game;
mod guard;

pub use game::{DrawOutcome, GameController, GuessOutcome};
