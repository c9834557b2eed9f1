//! Card service: the remote deck API the game plays against.
//!
//! ## Operations
//!
//! Only two calls are used:
//! - `shuffle_new_deck`: get a fresh shuffled deck and its id
//! - `draw`: take cards off the top of that deck
//!
//! ## Implementations
//!
//! - `DeckApiClient`: deckofcardsapi.com over HTTP (reqwest)
//! - `LocalDeckService`: in-process decks, seeded or scripted, for tests
//!   and simulations

pub mod http;
pub mod local;
pub mod wire;

use async_trait::async_trait;
use smallvec::SmallVec;

use crate::core::{Card, DeckId, ServiceError};

pub use http::DeckApiClient;
pub use local::LocalDeckService;

/// A freshly shuffled deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    pub id: DeckId,
    pub remaining: u8,
}

/// Cards taken by one draw call. Game draws are one card at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Drawn {
    pub cards: SmallVec<[Card; 1]>,
    /// Cards left in the deck after this draw.
    pub remaining: u8,
}

impl Drawn {
    /// True when the deck had nothing left to give.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// First drawn card, consuming the result.
    #[must_use]
    pub fn into_first(self) -> Option<Card> {
        self.cards.into_iter().next()
    }
}

/// The deck API as the controller sees it.
#[async_trait]
pub trait CardService: Send + Sync {
    /// Shuffle `deck_count` standard decks together into a new deck.
    async fn shuffle_new_deck(&self, deck_count: u8) -> Result<Deck, ServiceError>;

    /// Draw up to `count` cards from `deck`. An exhausted deck yields an
    /// empty `Drawn`, not an error.
    async fn draw(&self, deck: &DeckId, count: u8) -> Result<Drawn, ServiceError>;
}
