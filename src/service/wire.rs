//! JSON bodies of the deck API.
//!
//! Shuffle (`GET /new/shuffle/?deck_count=1`):
//! ```json
//! {"success": true, "deck_id": "3p40paa87x90", "shuffled": true, "remaining": 52}
//! ```
//!
//! Draw (`GET /<deck_id>/draw/?count=1`):
//! ```json
//! {"success": true, "deck_id": "3p40paa87x90", "remaining": 51,
//!  "cards": [{"code": "6H", "image": "https://.../6H.png", "value": "6", "suit": "HEARTS"}]}
//! ```
//!
//! Drawing past the end answers `success: false`, an empty card list and an
//! `error` message. That reply means exhaustion, not failure.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Deck, Drawn};
use crate::core::{Card, DeckId, ServiceError, FULL_DECK};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShuffleResponse {
    pub success: bool,
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub shuffled: bool,
    pub remaining: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrawResponse {
    pub success: bool,
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub cards: Vec<CardDto>,
    pub remaining: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDto {
    #[serde(default)]
    pub code: Option<String>,
    pub image: String,
    pub value: String,
    pub suit: String,
}

impl CardDto {
    pub fn into_card(self) -> Result<Card, ServiceError> {
        let rank = self.value.parse()?;
        let suit = self.suit.parse()?;
        Ok(Card::new(rank, suit).with_image(self.image))
    }
}

impl From<&Card> for CardDto {
    fn from(card: &Card) -> Self {
        Self {
            code: Some(card.code()),
            image: card.image.clone(),
            value: card.rank.api_name().to_string(),
            suit: card.suit.api_name().to_string(),
        }
    }
}

impl ShuffleResponse {
    pub fn into_deck(self) -> Result<Deck, ServiceError> {
        if !self.success {
            return Err(ServiceError::Rejected {
                reason: self.error.unwrap_or_else(|| "shuffle refused".to_string()),
            });
        }
        if self.deck_id.is_empty() {
            return Err(ServiceError::Decode("shuffle response without deck_id".to_string()));
        }
        Ok(Deck {
            id: DeckId::new(self.deck_id),
            remaining: clamp_count(self.remaining)?,
        })
    }
}

impl DrawResponse {
    pub fn into_drawn(self) -> Result<Drawn, ServiceError> {
        if !self.success && (!self.cards.is_empty() || self.remaining > 0) {
            return Err(ServiceError::Rejected {
                reason: self.error.unwrap_or_else(|| "draw refused".to_string()),
            });
        }
        let cards = self
            .cards
            .into_iter()
            .map(CardDto::into_card)
            .collect::<Result<SmallVec<[Card; 1]>, _>>()?;
        Ok(Drawn {
            cards,
            remaining: clamp_count(self.remaining)?,
        })
    }
}

/// Counts above one deck come from multi-deck shuffles; up to four decks
/// fit a `u8`.
fn clamp_count(remaining: u32) -> Result<u8, ServiceError> {
    u8::try_from(remaining).map_err(|_| {
        ServiceError::Decode(format!(
            "remaining count {remaining} out of range (one deck is {FULL_DECK})"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rank, Suit};

    #[test]
    fn test_shuffle_response() {
        let body = r#"{"success": true, "deck_id": "3p40paa87x90", "shuffled": true, "remaining": 52}"#;
        let deck = serde_json::from_str::<ShuffleResponse>(body)
            .unwrap()
            .into_deck()
            .unwrap();

        assert_eq!(deck.id.as_str(), "3p40paa87x90");
        assert_eq!(deck.remaining, 52);
    }

    #[test]
    fn test_shuffle_refused() {
        let body = r#"{"success": false, "deck_id": "", "remaining": 0, "error": "deck_count too large"}"#;
        let err = serde_json::from_str::<ShuffleResponse>(body)
            .unwrap()
            .into_deck()
            .unwrap_err();

        assert!(matches!(err, ServiceError::Rejected { reason } if reason == "deck_count too large"));
    }

    #[test]
    fn test_draw_response() {
        let body = r#"{
            "success": true,
            "deck_id": "kxozasf3edqu",
            "cards": [{
                "code": "0H",
                "image": "https://deckofcardsapi.com/static/img/0H.png",
                "images": {"svg": "https://deckofcardsapi.com/static/img/0H.svg"},
                "value": "10",
                "suit": "HEARTS"
            }],
            "remaining": 50
        }"#;
        let drawn = serde_json::from_str::<DrawResponse>(body)
            .unwrap()
            .into_drawn()
            .unwrap();

        assert_eq!(drawn.remaining, 50);
        let card = drawn.into_first().unwrap();
        assert_eq!(card.rank, Rank::Ten);
        assert_eq!(card.suit, Suit::Hearts);
        assert_eq!(card.image, "https://deckofcardsapi.com/static/img/0H.png");
    }

    #[test]
    fn test_draw_past_end_is_empty() {
        let body = r#"{
            "success": false,
            "deck_id": "kxozasf3edqu",
            "cards": [],
            "remaining": 0,
            "error": "Not enough cards remaining to draw 1 additional"
        }"#;
        let drawn = serde_json::from_str::<DrawResponse>(body)
            .unwrap()
            .into_drawn()
            .unwrap();

        assert!(drawn.is_empty());
        assert_eq!(drawn.remaining, 0);
    }

    #[test]
    fn test_draw_refused_with_cards_left() {
        let body = r#"{
            "success": false,
            "deck_id": "kxozasf3edqu",
            "cards": [],
            "remaining": 5,
            "error": "Deck ID does not exist."
        }"#;
        let err = serde_json::from_str::<DrawResponse>(body)
            .unwrap()
            .into_drawn()
            .unwrap_err();

        assert!(matches!(err, ServiceError::Rejected { reason } if reason == "Deck ID does not exist."));
    }

    #[test]
    fn test_draw_unknown_value() {
        let body = r#"{
            "success": true,
            "cards": [{"image": "x.png", "value": "JOKER", "suit": "HEARTS"}],
            "remaining": 10
        }"#;
        let err = serde_json::from_str::<DrawResponse>(body)
            .unwrap()
            .into_drawn()
            .unwrap_err();

        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn test_card_dto_from_card() {
        let dto = CardDto::from(&Card::new(Rank::Queen, Suit::Clubs));
        assert_eq!(dto.value, "QUEEN");
        assert_eq!(dto.suit, "CLUBS");
        assert_eq!(dto.code.as_deref(), Some("QC"));
    }
}
