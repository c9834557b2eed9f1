//! Core types: cards, session state, configuration, errors, RNG.
//!
//! Everything here is free of I/O. The controller, service adapters and
//! store build on these types.

pub mod card;
pub mod config;
pub mod error;
pub mod rng;
pub mod session;

pub use card::{Card, Rank, Suit};
pub use config::{GameConfig, BEST_SCORE_KEY, DEFAULT_API_URL};
pub use error::{CardParseError, GameError, ServiceCall, ServiceError, StoreError};
pub use rng::GameRng;
pub use session::{DeckId, RoundRecord, Session, Tally, FULL_DECK, MAX_GUESSES};
