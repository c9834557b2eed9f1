//! Higher-or-lower rules as pure functions.
//!
//! Every transition takes the session by value and hands back the next
//! one. Nothing here talks to the network or the presentation layer:
//! - `judge`: three-way outcome of one guess
//! - `begin_session`: fresh running session for a new deck
//! - `apply_draw`: reveal a card without judging it
//! - `apply_guess`: judge the drawn card against the face-up one
//! - `end_session`: stop the session, report its final score

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::card::{Card, Rank};
use crate::core::session::{DeckId, RoundRecord, Session, Tally};

/// Which way the player expects the next card to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Higher,
    Lower,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Higher => "higher",
            Direction::Lower => "lower",
        })
    }
}

/// Result of one guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    Tie,
}

impl Outcome {
    /// Score change for this outcome.
    #[must_use]
    pub const fn score_delta(self) -> i32 {
        match self {
            Outcome::Correct => 1,
            Outcome::Incorrect => -1,
            Outcome::Tie => 0,
        }
    }
}

/// Judge a guess. Equal ranks tie whatever the direction.
#[must_use]
pub fn judge(current: Rank, next: Rank, direction: Direction) -> Outcome {
    if next == current {
        return Outcome::Tie;
    }
    let went_higher = next > current;
    match (direction, went_higher) {
        (Direction::Higher, true) | (Direction::Lower, false) => Outcome::Correct,
        _ => Outcome::Incorrect,
    }
}

/// What the card service returned for a one-card draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    /// The drawn card. `None` means the deck is exhausted.
    pub card: Option<Card>,
    /// Remaining count reported by the service.
    pub remaining: u8,
}

impl Draw {
    #[must_use]
    pub fn card(card: Card, remaining: u8) -> Self {
        Self {
            card: Some(card),
            remaining,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            card: None,
            remaining: 0,
        }
    }
}

/// Session after a transition, plus what happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub session: Session,
    /// Set when a guess was judged.
    pub round: Option<RoundRecord>,
    /// The session has to end: empty draw, or the last card was judged.
    pub exhausted: bool,
}

/// Fresh running session for `deck_id`. Counters start at zero and
/// `remaining` is the freshly shuffled deck's size (52 for one deck); the
/// first card still has to be drawn.
#[must_use]
pub fn begin_session(deck_id: DeckId, remaining: u8, epoch: u64) -> Session {
    Session {
        deck_id: Some(deck_id),
        current_card: None,
        score: 0,
        tally: Tally::default(),
        remaining,
        running: true,
        epoch,
        history: im::Vector::new(),
    }
}

/// Reveal a card. An empty draw leaves the session untouched and flags
/// exhaustion.
#[must_use]
pub fn apply_draw(mut session: Session, draw: Draw) -> Step {
    let Some(card) = draw.card else {
        return Step {
            session,
            round: None,
            exhausted: true,
        };
    };
    session.remaining = next_remaining(session.remaining, draw.remaining);
    session.current_card = Some(card);
    Step {
        session,
        round: None,
        exhausted: false,
    }
}

/// Judge the drawn card against the face-up one, then make it the face-up
/// card. Exhaustion is flagged on an empty draw and when no cards remain
/// after this one.
///
/// With no face-up card yet the drawn card is only revealed.
#[must_use]
pub fn apply_guess(mut session: Session, direction: Direction, draw: Draw) -> Step {
    let Some(drawn) = draw.card else {
        return Step {
            session,
            round: None,
            exhausted: true,
        };
    };
    let Some(previous) = session.current_card.take() else {
        return apply_draw(session, Draw::card(drawn, draw.remaining));
    };

    let outcome = judge(previous.rank, drawn.rank, direction);
    session.score += outcome.score_delta();
    session.tally.record(outcome);

    let round = RoundRecord {
        previous,
        drawn: drawn.clone(),
        direction,
        outcome,
        score_after: session.score,
    };
    session.history.push_back(round.clone());
    session.current_card = Some(drawn);
    session.remaining = next_remaining(session.remaining, draw.remaining);

    let exhausted = session.remaining == 0;
    Step {
        session,
        round: Some(round),
        exhausted,
    }
}

/// Stop the session and release its deck. Returns the final score if the
/// session was running; ending an idle session changes nothing.
#[must_use]
pub fn end_session(mut session: Session) -> (Session, Option<i32>) {
    if !session.running {
        return (session, None);
    }
    session.running = false;
    session.deck_id = None;
    let score = session.score;
    (session, Some(score))
}

/// Take the service's count, but never let it climb: the deck only shrinks.
fn next_remaining(current: u8, reported: u8) -> u8 {
    let expected = current.saturating_sub(1);
    if reported != expected {
        warn!(current, reported, "card service reported an unexpected remaining count");
    }
    reported.min(expected)
}
