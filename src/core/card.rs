//! Playing cards as the deck service reports them.
//!
//! ## Rank Values
//!
//! Ranks compare by face value with the ace low:
//! `ACE=1`, `2..=10` numeric, `JACK=11`, `QUEEN=12`, `KING=13`.
//! Suits never take part in a comparison.
//!
//! ## Wire Names
//!
//! The deck API spells ranks as `ACE`, `2`..`10`, `JACK`, `QUEEN`, `KING`
//! and suits as `SPADES`, `HEARTS`, `DIAMONDS`, `CLUBS`. Card codes are two
//! characters with `0` standing for ten (`0H` is the ten of hearts).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CardParseError;

/// Base URL for card face images served by the public deck API.
pub const DEFAULT_IMAGE_BASE: &str = "https://deckofcardsapi.com/static/img";

/// Card rank. The discriminant is the comparison value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Rank {
    /// All ranks in ascending order.
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Comparison value (1-13).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Look up a rank by comparison value.
    #[must_use]
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    /// Name used by the deck API (`"ACE"`, `"7"`, `"QUEEN"`).
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Rank::Ace => "ACE",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "JACK",
            Rank::Queen => "QUEEN",
            Rank::King => "KING",
        }
    }

    /// First character of the card code.
    #[must_use]
    pub const fn code_char(self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => '0',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        }
    }

    /// Short label for display (`"A"`, `"10"`, `"K"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            other => other.api_name(),
        }
    }
}

impl FromStr for Rank {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "ACE" | "A" => Ok(Rank::Ace),
            "JACK" | "J" => Ok(Rank::Jack),
            "QUEEN" | "Q" => Ok(Rank::Queen),
            "KING" | "K" => Ok(Rank::King),
            numeric => numeric
                .parse::<u8>()
                .ok()
                .filter(|v| (2..=10).contains(v))
                .and_then(Rank::from_value)
                .ok_or_else(|| CardParseError::Rank(s.to_string())),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Card suit. Carried for display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Suit::Spades => "SPADES",
            Suit::Hearts => "HEARTS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Clubs => "CLUBS",
        }
    }

    #[must_use]
    pub const fn code_char(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }

    /// Hearts and diamonds.
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

impl FromStr for Suit {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPADES" | "S" => Ok(Suit::Spades),
            "HEARTS" | "H" => Ok(Suit::Hearts),
            "DIAMONDS" | "D" => Ok(Suit::Diamonds),
            "CLUBS" | "C" => Ok(Suit::Clubs),
            _ => Err(CardParseError::Suit(s.to_string())),
        }
    }
}

/// A drawn card: rank, suit and the locator of its face image.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    /// Where the presentation layer can fetch the card face.
    pub image: String,
}

impl Card {
    /// Create a card with the public API's image locator.
    #[must_use]
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self::with_image_base(rank, suit, DEFAULT_IMAGE_BASE)
    }

    /// Create a card whose image lives under `base`.
    #[must_use]
    pub fn with_image_base(rank: Rank, suit: Suit, base: &str) -> Self {
        let code = code_for(rank, suit);
        Self {
            rank,
            suit,
            image: format!("{}/{}.png", base.trim_end_matches('/'), code),
        }
    }

    /// Replace the image locator.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Two-character code (`"AS"`, `"0H"`).
    #[must_use]
    pub fn code(&self) -> String {
        code_for(self.rank, self.suit)
    }

    /// Parse a two-character code with the public image locator.
    pub fn from_code(code: &str) -> Result<Self, CardParseError> {
        let mut chars = code.trim().chars();
        let (Some(rank_ch), Some(suit_ch), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(CardParseError::Code(code.to_string()));
        };
        let rank = if rank_ch == '0' {
            Rank::Ten
        } else {
            rank_ch.to_string().parse()?
        };
        let suit = suit_ch.to_string().parse()?;
        Ok(Self::new(rank, suit))
    }

    /// Every card of a standard 52-card deck, suit by suit.
    #[must_use]
    pub fn full_deck() -> Vec<Card> {
        Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
            .collect()
    }
}

fn code_for(rank: Rank, suit: Suit) -> String {
    let mut code = String::with_capacity(2);
    code.push(rank.code_char());
    code.push(suit.code_char());
    code
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}
