//! Card image preloading.
//!
//! A card is only shown once its face image can be displayed without a
//! visible fetch. The controller asks an `AssetLoader` to preload the
//! image before it announces the card; a failed preload is logged and the
//! card is shown anyway.
//!
//! `warm_up` fills the cache ahead of the first game by dealing a
//! throwaway deck and preloading all 52 faces.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::Client;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::core::{Card, ServiceError, FULL_DECK};
use crate::service::CardService;

/// Makes a card's face image available for display.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fetch the card's image if it is not already available.
    async fn preload(&self, card: &Card) -> Result<(), ServiceError>;
}

/// Loader that does nothing. For presenters that do not draw images.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAssetLoader;

#[async_trait]
impl AssetLoader for NoopAssetLoader {
    async fn preload(&self, _card: &Card) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Fetches images over HTTP and keeps the bytes in memory.
#[derive(Debug)]
pub struct HttpAssetLoader {
    client: Client,
    cache: Mutex<FxHashMap<String, Bytes>>,
}

impl HttpAssetLoader {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Cached image bytes for `locator`.
    #[must_use]
    pub fn cached(&self, locator: &str) -> Option<Bytes> {
        self.cache.lock().get(locator).cloned()
    }

    /// Number of cached images.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn preload(&self, card: &Card) -> Result<(), ServiceError> {
        if self.cache.lock().contains_key(&card.image) {
            return Ok(());
        }
        let response = self.client.get(&card.image).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(image = %card.image, bytes = body.len(), "card image cached");
        self.cache.lock().insert(card.image.clone(), body);
        Ok(())
    }
}

/// Deal a throwaway deck and preload every face image.
///
/// Individual image failures are skipped. Returns how many images loaded;
/// a failing shuffle or draw aborts the warm-up with the service error.
pub async fn warm_up(
    service: &dyn CardService,
    loader: &dyn AssetLoader,
) -> Result<usize, ServiceError> {
    let deck = service.shuffle_new_deck(1).await?;
    let drawn = service.draw(&deck.id, FULL_DECK).await?;

    let mut loaded = 0;
    for card in &drawn.cards {
        match loader.preload(card).await {
            Ok(()) => loaded += 1,
            Err(err) => debug!(card = %card, error = %err, "warm-up image skipped"),
        }
    }
    info!(loaded, total = drawn.cards.len(), "card images warmed up");
    Ok(loaded)
}
