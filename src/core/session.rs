//! Session state: one play-through from start to end.
//!
//! ## Session
//!
//! Holds everything transient about the current game:
//! - Deck on the card service and the face-up card
//! - Score and the correct/incorrect/tie tally
//! - Cards remaining and whether guesses are accepted
//! - Round history
//!
//! The best score is not here. It outlives sessions and lives in
//! `store::BestScore`.
//!
//! Uses `im::Vector` for the history so snapshots handed to callers clone
//! in O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::rules::{Direction, Outcome};

/// Cards in a fresh deck.
pub const FULL_DECK: u8 = 52;

/// Most guesses one deck allows: every card after the first.
pub const MAX_GUESSES: u32 = FULL_DECK as u32 - 1;

/// Opaque deck token issued by the card service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckId(String);

impl DeckId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correct/incorrect/tie counters. Three buckets of the statistics chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
    pub ties: u32,
}

impl Tally {
    /// Guesses judged so far.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.ties
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::Tie => self.ties += 1,
        }
    }

    /// Buckets in chart order: correct, incorrect, ties.
    #[must_use]
    pub fn buckets(&self) -> [u32; 3] {
        [self.correct, self.incorrect, self.ties]
    }
}

/// One judged guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Card face-up when the guess was made.
    pub previous: Card,
    /// Card drawn to settle the guess.
    pub drawn: Card,
    pub direction: Direction,
    pub outcome: Outcome,
    /// Score after this round was applied.
    pub score_after: i32,
}

/// Mutable game state for one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Deck on the card service. Set on start, cleared on end.
    pub deck_id: Option<DeckId>,

    /// Face-up card. `None` until the first draw.
    pub current_card: Option<Card>,

    /// +1 correct, -1 incorrect, unchanged on tie.
    pub score: i32,

    /// Outcome counters, reset on start.
    pub tally: Tally,

    /// Cards left in the deck as last reported by the service.
    pub remaining: u8,

    /// Whether guesses are accepted.
    pub running: bool,

    /// Generation of this session. Bumped on every start so late network
    /// results from an older session can be recognised.
    pub epoch: u64,

    /// Judged rounds, oldest first.
    pub history: Vector<RoundRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

impl Session {
    /// The state before any game has been started.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            deck_id: None,
            current_card: None,
            score: 0,
            tally: Tally::default(),
            remaining: FULL_DECK,
            running: false,
            epoch: 0,
            history: Vector::new(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True if a result issued for `epoch` may still be applied.
    #[must_use]
    pub fn accepts(&self, epoch: u64) -> bool {
        self.running && self.epoch == epoch
    }

    /// Last judged round.
    #[must_use]
    pub fn last_round(&self) -> Option<&RoundRecord> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::{Rank, Suit};

    #[test]
    fn test_idle_session() {
        let session = Session::idle();
        assert!(!session.is_running());
        assert_eq!(session.score, 0);
        assert_eq!(session.remaining, FULL_DECK);
        assert_eq!(session.tally.total(), 0);
        assert!(session.deck_id.is_none());
        assert!(session.current_card.is_none());
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::default();
        tally.record(Outcome::Correct);
        tally.record(Outcome::Correct);
        tally.record(Outcome::Incorrect);
        tally.record(Outcome::Tie);

        assert_eq!(tally.buckets(), [2, 1, 1]);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn test_accepts_checks_epoch_and_running() {
        let mut session = Session::idle();
        session.epoch = 3;
        assert!(!session.accepts(3));

        session.running = true;
        assert!(session.accepts(3));
        assert!(!session.accepts(2));
    }

    #[test]
    fn test_snapshot_shares_history() {
        let mut session = Session::idle();
        let card = Card::new(Rank::Five, Suit::Clubs);
        session.history.push_back(RoundRecord {
            previous: card.clone(),
            drawn: card,
            direction: Direction::Higher,
            outcome: Outcome::Tie,
            score_after: 0,
        });

        let snapshot = session.clone();
        session.score = 4;

        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.score, 0);
        assert_eq!(session.last_round().map(|r| r.outcome), Some(Outcome::Tie));
    }

    #[test]
    fn test_deck_id_display() {
        let id = DeckId::new("3p40paa87x90");
        assert_eq!(id.as_str(), "3p40paa87x90");
        assert_eq!(id.to_string(), "3p40paa87x90");
    }
}
