//! Persistence boundary of the record model
//!
//! Records cross this boundary as `(reversed_url, bytes)` pairs: the codec
//! in [`codec`] flattens a record into its persisted form and back, and a
//! [`Store`] moves opaque byte values under string keys. [`RecordDb`] ties
//! the two together and is the surface the pipeline stages use.

pub mod codec;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::record::{CrawlRecord, Sequencer};
use crate::url::reverse_url_or_empty;
use thiserror::Error;

/// Errors crossing the storage boundary
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("record has no storage key: {0}")]
    Unkeyed(String),
}

/// A key/value store holding encoded records under reversed-url keys
///
/// Implementations are oblivious to the record model; they move bytes. The
/// store guarantees per-key read-your-writes consistency, which is all the
/// single-owner record model requires.
pub trait Store {
    /// Returns the value under `key`, or None when absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Removes the value under `key`; returns whether one existed
    fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Record-level view over a [`Store`]
///
/// Owns the id sequencer so that every record hydrated through this database
/// gets a process-scoped id.
pub struct RecordDb<S: Store> {
    store: S,
    seq: Sequencer,
}

impl<S: Store> RecordDb<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            seq: Sequencer::new(),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    /// Loads the record for a URL
    ///
    /// Absence is an ordinary outcome, not an error: unknown URLs and URLs
    /// that cannot be keyed both come back as None.
    pub fn get_record(&self, url: &str) -> Result<Option<CrawlRecord>, StorageError> {
        let key = reverse_url_or_empty(url);
        if key.is_empty() {
            return Ok(None);
        }

        match self.store.get(&key)? {
            Some(bytes) => {
                let record = codec::decode(url, &key, &bytes, &self.seq)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Persists a record under its reversed-url key
    ///
    /// A record without a key cannot be stored; that is a caller bug surfaced
    /// as [`StorageError::Unkeyed`].
    pub fn put_record(&self, record: &CrawlRecord) -> Result<(), StorageError> {
        if !record.is_persistable() {
            return Err(StorageError::Unkeyed(record.url().to_string()));
        }

        let bytes = codec::encode(record)?;
        self.store.put(record.key(), &bytes)
    }

    /// Removes the record for a URL; returns whether one existed
    pub fn delete_record(&self, url: &str) -> Result<bool, StorageError> {
        let key = reverse_url_or_empty(url);
        if key.is_empty() {
            return Ok(false);
        }
        self.store.delete(&key)
    }
}
