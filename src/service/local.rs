//! In-process card service.
//!
//! Deals from decks held in memory instead of calling the deck API. Two
//! flavours:
//! - `seeded(seed)`: every new deck is a full 52 cards shuffled with a
//!   ChaCha8 stream derived from the seed
//! - `scripted(cards)`: every new deck deals exactly `cards`, first card
//!   on top
//!
//! Tests can make the next call fail and add latency to every call.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{CardService, Deck, Drawn};
use crate::core::{Card, CardParseError, DeckId, GameRng, ServiceError, FULL_DECK};

/// How new decks are filled.
#[derive(Clone, Debug)]
enum DeckSource {
    Seeded(GameRng),
    Scripted(Vec<Card>),
}

/// Calls that can be made to fail once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalFault {
    Shuffle,
    Draw,
}

#[derive(Debug)]
struct Inner {
    source: DeckSource,
    /// Undealt cards per deck, top of deck at the end.
    decks: FxHashMap<DeckId, Vec<Card>>,
    decks_dealt: u64,
    faults: SmallVec<[LocalFault; 2]>,
    shuffle_calls: u32,
    draw_calls: u32,
}

/// `CardService` that never leaves the process.
#[derive(Debug)]
pub struct LocalDeckService {
    inner: Mutex<Inner>,
    latency: Duration,
}

impl LocalDeckService {
    fn with_source(source: DeckSource) -> Self {
        Self {
            inner: Mutex::new(Inner {
                source,
                decks: FxHashMap::default(),
                decks_dealt: 0,
                faults: SmallVec::new(),
                shuffle_calls: 0,
                draw_calls: 0,
            }),
            latency: Duration::ZERO,
        }
    }

    /// Full shuffled decks, reproducible from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(DeckSource::Seeded(GameRng::new(seed)))
    }

    /// Decks that deal `cards` in order.
    #[must_use]
    pub fn scripted(cards: Vec<Card>) -> Self {
        Self::with_source(DeckSource::Scripted(cards))
    }

    /// Scripted deck from card codes (`"AS"`, `"5D"`).
    pub fn from_codes(codes: &[&str]) -> Result<Self, CardParseError> {
        let cards = codes
            .iter()
            .map(|code| Card::from_code(code))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::scripted(cards))
    }

    /// Wait `latency` before answering each call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next call of this kind fail with a 503.
    pub fn fail_next(&self, fault: LocalFault) {
        self.inner.lock().faults.push(fault);
    }

    /// Shuffle calls answered so far, failures included.
    #[must_use]
    pub fn shuffle_calls(&self) -> u32 {
        self.inner.lock().shuffle_calls
    }

    /// Draw calls answered so far, failures included.
    #[must_use]
    pub fn draw_calls(&self) -> u32 {
        self.inner.lock().draw_calls
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Inner {
    fn take_fault(&mut self, fault: LocalFault) -> Result<(), ServiceError> {
        if let Some(pos) = self.faults.iter().position(|f| *f == fault) {
            self.faults.remove(pos);
            return Err(ServiceError::Status { status: 503 });
        }
        Ok(())
    }

    fn new_deck(&mut self, deck_count: u8) -> (DeckId, Vec<Card>) {
        self.decks_dealt += 1;
        let mut cards = match &self.source {
            DeckSource::Seeded(rng) => {
                let mut cards: Vec<Card> = (0..deck_count.max(1))
                    .flat_map(|_| Card::full_deck())
                    .collect();
                rng.for_deck(self.decks_dealt).shuffle(&mut cards);
                cards
            }
            DeckSource::Scripted(script) => script.clone(),
        };
        // Top of deck at the end so dealing is a pop.
        cards.reverse();

        let token = match &self.source {
            DeckSource::Seeded(rng) => rng.for_deck(self.decks_dealt).deck_token(),
            DeckSource::Scripted(_) => format!("local{:07}", self.decks_dealt),
        };
        (DeckId::new(token), cards)
    }
}

#[async_trait]
impl CardService for LocalDeckService {
    async fn shuffle_new_deck(&self, deck_count: u8) -> Result<Deck, ServiceError> {
        self.pause().await;
        let mut inner = self.inner.lock();
        inner.shuffle_calls += 1;
        inner.take_fault(LocalFault::Shuffle)?;

        let (id, cards) = inner.new_deck(deck_count);
        let remaining = u8::try_from(cards.len()).unwrap_or(u8::MAX);
        inner.decks.insert(id.clone(), cards);
        Ok(Deck { id, remaining })
    }

    async fn draw(&self, deck: &DeckId, count: u8) -> Result<Drawn, ServiceError> {
        self.pause().await;
        let mut inner = self.inner.lock();
        inner.draw_calls += 1;
        inner.take_fault(LocalFault::Draw)?;

        let cards = inner
            .decks
            .get_mut(deck)
            .ok_or_else(|| ServiceError::UnknownDeck(deck.clone()))?;
        let take = usize::from(count).min(cards.len());
        let drawn: SmallVec<[Card; 1]> = (0..take).filter_map(|_| cards.pop()).collect();
        let remaining = u8::try_from(cards.len()).unwrap_or(u8::MAX);
        Ok(Drawn {
            cards: drawn,
            remaining,
        })
    }
}

impl Default for LocalDeckService {
    fn default() -> Self {
        Self::seeded(u64::from(FULL_DECK))
    }
}
