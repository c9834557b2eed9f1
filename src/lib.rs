//! # higher-lower
//!
//! Higher-or-lower card game played against a remote deck API.
//!
//! The player sees one face-up card and guesses whether the next card off
//! the deck ranks higher or lower. A correct guess scores +1, a wrong one
//! -1, an equal rank is a tie and scores nothing. The session ends when
//! the player stops or the deck runs out; the best final score is kept
//! across sessions.
//!
//! ## Design Principles
//!
//! 1. **Pure Rules**: Scoring, counting and exhaustion live in `rules` as
//!    functions over an owned `Session`. They never touch the network.
//!
//! 2. **Explicit Async**: The controller awaits the card service in plain
//!    `async fn`s. Every call is time-bounded and a failed call leaves the
//!    session as it was.
//!
//! 3. **One Operation At A Time**: While a call is in flight further
//!    operations are rejected (`GameError::Busy`); results that arrive
//!    after a stop are dropped.
//!
//! ## Modules
//!
//! - `core`: Cards, session state, configuration, errors, RNG
//! - `rules`: Guess judging and session transitions
//! - `service`: Card service trait, HTTP client and in-process decks
//! - `assets`: Card image preloading
//! - `store`: Best-score persistence
//! - `events`: Presentation events and the `Presenter` trait
//! - `controller`: The game session controller
//! - `input`: Key to command mapping
//! - `ui`: Terminal presenter
//! - `telemetry`: Tracing setup

pub mod core;
pub mod rules;
pub mod service;
pub mod assets;
pub mod store;
pub mod events;
pub mod controller;
pub mod input;
pub mod ui;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::{
    Card, Rank, Suit,
    DeckId, Session, Tally, RoundRecord, FULL_DECK, MAX_GUESSES,
    GameConfig, GameRng,
    GameError, ServiceError, ServiceCall, StoreError, CardParseError,
};

pub use crate::rules::{judge, Direction, Outcome};

pub use crate::service::{CardService, Deck, Drawn, DeckApiClient, LocalDeckService};

pub use crate::assets::{AssetLoader, HttpAssetLoader, NoopAssetLoader};

pub use crate::store::{BestScore, FileScoreStore, MemoryScoreStore, ScoreStore};

pub use crate::events::{FeedbackKind, GameEvent, Presenter, RecordingPresenter};

pub use crate::controller::{DrawOutcome, GameController, GuessOutcome};

pub use crate::input::Command;

pub use crate::ui::TerminalPresenter;
