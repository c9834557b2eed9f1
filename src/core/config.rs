//! Game configuration.
//!
//! `GameConfig` collects everything the controller and the HTTP adapters
//! need to know at startup:
//! - Where the deck API lives and how many decks to shuffle together
//! - How long a single service call may take
//! - How long to pause on the last card before the session ends
//! - Whether to warm the image cache with a throwaway deck
//!
//! Defaults reproduce the public deckofcardsapi.com setup.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default deck API endpoint.
pub const DEFAULT_API_URL: &str = "https://deckofcardsapi.com/api/deck";

/// Key the best score is stored under.
pub const BEST_SCORE_KEY: &str = "best_score";

/// Controller and adapter configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Base URL of the deck API, without trailing slash.
    pub api_url: String,

    /// Decks shuffled together on start (the game expects 1).
    pub deck_count: u8,

    /// Upper bound for any single service call.
    pub request_timeout: Duration,

    /// Pause after the last card is judged before the session ends.
    pub exhaustion_delay: Duration,

    /// Preload every card image from a throwaway deck at startup.
    pub warm_up: bool,

    /// Best-score file. `None` uses the platform data directory.
    pub score_file: Option<PathBuf>,

    /// Key the best score is stored under.
    pub score_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            deck_count: 1,
            request_timeout: Duration::from_secs(10),
            exhaustion_delay: Duration::from_millis(1500),
            warm_up: true,
            score_file: None,
            score_key: BEST_SCORE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at a different deck API.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the pause before an exhausted deck ends the session.
    #[must_use]
    pub fn with_exhaustion_delay(mut self, delay: Duration) -> Self {
        self.exhaustion_delay = delay;
        self
    }

    /// Enable or disable the startup image warm-up.
    #[must_use]
    pub fn with_warm_up(mut self, enabled: bool) -> Self {
        self.warm_up = enabled;
        self
    }

    /// Store the best score in `path`.
    #[must_use]
    pub fn with_score_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.score_file = Some(path.into());
        self
    }

    /// Configuration for tests: no pauses, no warm-up, short timeout.
    #[must_use]
    pub fn for_tests() -> Self {
        Self::default()
            .with_request_timeout(Duration::from_secs(2))
            .with_exhaustion_delay(Duration::ZERO)
            .with_warm_up(false)
    }

    /// Resolve the best-score file: explicit path, else
    /// `<data dir>/higher-lower/scores.bin`, else the working directory.
    #[must_use]
    pub fn score_path(&self) -> PathBuf {
        if let Some(path) = &self.score_file {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("higher-lower").join("scores.bin"))
            .unwrap_or_else(|| PathBuf::from("higher-lower-scores.bin"))
    }
}
