//! Error types.
//!
//! - `CardParseError`: a rank, suit or code the deck API should never send
//! - `ServiceError`: anything that went wrong talking to the card service
//! - `StoreError`: best-score persistence failures
//! - `GameError`: what a controller operation reports to its caller

use std::time::Duration;

use thiserror::Error;

use super::session::DeckId;

/// Unrecognised card data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CardParseError {
    #[error("unknown rank `{0}`")]
    Rank(String),
    #[error("unknown suit `{0}`")]
    Suit(String),
    #[error("malformed card code `{0}`")]
    Code(String),
}

/// Failure of a single call to the card service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("service answered with status {status}")]
    Status { status: u16 },

    /// The service answered `success: false`.
    #[error("service rejected the request: {reason}")]
    Rejected { reason: String },

    /// The response body was not what the protocol promises.
    #[error("malformed response: {0}")]
    Decode(String),

    /// No answer within the configured bound.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The deck id is not known to the service.
    #[error("unknown deck {0}")]
    UnknownDeck(DeckId),
}

impl From<CardParseError> for ServiceError {
    fn from(err: CardParseError) -> Self {
        ServiceError::Decode(err.to_string())
    }
}

/// Best-score persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file encoding: {0}")]
    Encode(#[from] bincode::Error),
}

/// Which card-service call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceCall {
    Shuffle,
    Draw,
    Guess,
}

impl std::fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ServiceCall::Shuffle => "shuffle",
            ServiceCall::Draw => "draw",
            ServiceCall::Guess => "guess",
        })
    }
}

/// Error returned by controller operations.
///
/// Only `ServiceUnavailable` is a failure of the game itself; the others
/// reject an operation that was not allowed in the current state. None is
/// fatal: the controller stays usable for another `start`.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("card service unavailable during {call}: {source}")]
    ServiceUnavailable {
        call: ServiceCall,
        #[source]
        source: ServiceError,
    },

    /// Another operation is still waiting on the service.
    #[error("an operation is already in progress")]
    Busy,

    #[error("no game is running")]
    NotRunning,

    #[error("a game is already running")]
    AlreadyRunning,
}

impl GameError {
    #[must_use]
    pub fn unavailable(call: ServiceCall, source: ServiceError) -> Self {
        GameError::ServiceUnavailable { call, source }
    }

    /// True for `ServiceUnavailable`.
    #[must_use]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, GameError::ServiceUnavailable { .. })
    }
}
