//! Best-score persistence.
//!
//! The only state that outlives a session is the best score: a single
//! integer under a fixed key. `BestScore` loads it once at startup and
//! writes it back whenever a finished session beats it.
//!
//! ## Stores
//!
//! - `FileScoreStore`: bincode-encoded key/value map in one file, replaced
//!   atomically (temp file + rename)
//! - `MemoryScoreStore`: for tests

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::core::StoreError;

/// Key/value storage for integer scores.
pub trait ScoreStore: Send + Sync {
    /// Value under `key`, `None` if never written.
    fn load(&self, key: &str) -> Result<Option<i32>, StoreError>;

    /// Write `value` under `key`.
    fn save(&self, key: &str, value: i32) -> Result<(), StoreError>;
}

/// Scores kept in memory.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    values: Mutex<BTreeMap<String, i32>>,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with one value.
    #[must_use]
    pub fn with_value(key: &str, value: i32) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_string(), value);
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self, key: &str) -> Result<Option<i32>, StoreError> {
        Ok(self.values.lock().get(key).copied())
    }

    fn save(&self, key: &str, value: i32) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Scores in a bincode file.
///
/// A missing or empty file reads as no scores; an undecodable one is
/// replaced on the next save. Saves rewrite the whole map through a temp
/// file in the same directory and rename it into place.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileScoreStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, i32>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(bincode::deserialize(&bytes)?)
    }

    fn write_all(&self, values: &BTreeMap<String, i32>) -> Result<(), StoreError> {
        let bytes = bincode::serialize(values)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self, key: &str) -> Result<Option<i32>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&self, key: &str, value: i32) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StoreError::Encode(err)) => {
                warn!(path = %self.path.display(), error = %err, "replacing unreadable score file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }
}

/// Process-wide best score.
///
/// Loaded once, only ever raised. A failed write is logged and the raised
/// value is kept in memory; losing the record on disk never stops a game.
pub struct BestScore {
    store: Box<dyn ScoreStore>,
    key: String,
    value: Mutex<i32>,
}

impl BestScore {
    /// Load the best score under `key`. A missing value or an unreadable
    /// store starts at 0.
    #[must_use]
    pub fn load(store: Box<dyn ScoreStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let value = match store.load(&key) {
            Ok(value) => value.unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "could not load best score, starting from 0");
                0
            }
        };
        Self {
            store,
            key,
            value: Mutex::new(value),
        }
    }

    /// In-memory best score without persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryScoreStore::new()), crate::core::BEST_SCORE_KEY)
    }

    #[must_use]
    pub fn get(&self) -> i32 {
        *self.value.lock()
    }

    /// Raise the best score to `score` if it is strictly higher.
    /// Returns true when a new record was set.
    ///
    /// The value lock is held through the write, so records reach the store
    /// in rising order.
    pub fn offer(&self, score: i32) -> bool {
        let mut best = self.value.lock();
        if score <= *best {
            return false;
        }
        *best = score;

        info!(score, "new best score");
        if let Err(err) = self.store.save(&self.key, score) {
            warn!(error = %err, score, "could not persist best score");
        }
        true
    }
}

impl std::fmt::Debug for BestScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BestScore")
            .field("key", &self.key)
            .field("value", &self.get())
            .finish()
    }
}
