//! Deck API client over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{DrawResponse, ShuffleResponse};
use super::{CardService, Deck, Drawn};
use crate::core::{DeckId, GameConfig, ServiceError};

/// `CardService` backed by deckofcardsapi.com or a compatible server.
#[derive(Clone, Debug)]
pub struct DeckApiClient {
    client: Client,
    base_url: String,
}

impl DeckApiClient {
    /// Build a client for `config.api_url`. The reqwest client carries the
    /// configured request timeout as well.
    pub fn new(config: &GameConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("higher-lower/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    /// Use an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying reqwest client, shared with the image loader.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn shuffle_url(&self, deck_count: u8) -> String {
        format!("{}/new/shuffle/?deck_count={}", self.base_url, deck_count)
    }

    pub(crate) fn draw_url(&self, deck: &DeckId, count: u8) -> String {
        format!("{}/{}/draw/?count={}", self.base_url, deck.as_str(), count)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // An over-draw answers 200 with `success: false`; anything non-2xx is a
        // real failure.
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

#[async_trait]
impl CardService for DeckApiClient {
    async fn shuffle_new_deck(&self, deck_count: u8) -> Result<Deck, ServiceError> {
        let url = self.shuffle_url(deck_count);
        debug!(%url, "shuffling new deck");
        let body: ShuffleResponse = self.get_json(&url).await?;
        body.into_deck()
    }

    async fn draw(&self, deck: &DeckId, count: u8) -> Result<Drawn, ServiceError> {
        let url = self.draw_url(deck, count);
        debug!(%url, "drawing");
        let body: DrawResponse = self.get_json(&url).await?;
        body.into_drawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = DeckApiClient::with_client(Client::new(), "https://deckofcardsapi.com/api/deck/");

        assert_eq!(client.base_url(), "https://deckofcardsapi.com/api/deck");
        assert_eq!(
            client.shuffle_url(1),
            "https://deckofcardsapi.com/api/deck/new/shuffle/?deck_count=1"
        );
        assert_eq!(
            client.draw_url(&DeckId::new("3p40paa87x90"), 1),
            "https://deckofcardsapi.com/api/deck/3p40paa87x90/draw/?count=1"
        );
    }

    #[test]
    fn test_new_from_config() {
        let config = GameConfig::new().with_api_url("http://127.0.0.1:9/api/deck");
        let client = DeckApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api/deck");
    }
}
