//! Storage traits and error types
//!
//! This module defines the key/value interface of the durable state store and
//! the typed accessors every harvest stage uses on top of it.

use crate::fetch::ProfileRecord;
use crate::state::{CrawlPhase, CrawlState, FetchStatus, IdentifierSet};
use crate::storage::keys;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable key/value state backends
///
/// Values are whole JSON documents. `set_raw` must replace the previous value
/// atomically; a concurrent reader sees either the old or the new document.
pub trait StateStore {
    // ===== Raw Access =====

    /// Reads the document stored under `key`
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replaces the document stored under `key`
    fn set_raw(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    // ===== Crawl State =====

    /// Loads the persisted crawl state, if a crawl is underway
    fn load_crawl_state(&self) -> StorageResult<Option<CrawlState>> {
        decode(keys::CRAWL_STATE, self.get_raw(keys::CRAWL_STATE)?)
    }

    /// Replaces the persisted crawl state
    fn save_crawl_state(&mut self, state: &CrawlState) -> StorageResult<()> {
        self.set_raw(keys::CRAWL_STATE, &encode(keys::CRAWL_STATE, state)?)
    }

    /// Forgets the persisted crawl state
    fn clear_crawl_state(&mut self) -> StorageResult<()> {
        self.remove(keys::CRAWL_STATE)
    }

    /// Loads the crawl phase marker, `Idle` when none was written
    fn load_crawl_phase(&self) -> StorageResult<CrawlPhase> {
        Ok(decode(keys::CRAWL_PHASE, self.get_raw(keys::CRAWL_PHASE)?)?.unwrap_or_default())
    }

    /// Replaces the crawl phase marker
    fn save_crawl_phase(&mut self, phase: CrawlPhase) -> StorageResult<()> {
        self.set_raw(keys::CRAWL_PHASE, &encode(keys::CRAWL_PHASE, &phase)?)
    }

    // ===== Fetch Status =====

    /// Loads the status of the last profile fetch batch
    fn load_fetch_status(&self) -> StorageResult<Option<FetchStatus>> {
        decode(keys::FETCH_STATUS, self.get_raw(keys::FETCH_STATUS)?)
    }

    /// Replaces the status of the profile fetch batch
    fn save_fetch_status(&mut self, status: &FetchStatus) -> StorageResult<()> {
        self.set_raw(keys::FETCH_STATUS, &encode(keys::FETCH_STATUS, status)?)
    }

    // ===== Results =====

    /// Loads the usernames handed off by the last completed scrape
    fn load_identifiers(&self) -> StorageResult<IdentifierSet> {
        Ok(decode(keys::IDENTIFIERS, self.get_raw(keys::IDENTIFIERS)?)?.unwrap_or_default())
    }

    /// Replaces the usernames handed off to the fetch stage
    fn save_identifiers(&mut self, identifiers: &IdentifierSet) -> StorageResult<()> {
        self.set_raw(keys::IDENTIFIERS, &encode(keys::IDENTIFIERS, identifiers)?)
    }

    /// Loads the profiles of the last successful fetch batch
    fn load_profiles(&self) -> StorageResult<Vec<ProfileRecord>> {
        Ok(decode(keys::PROFILES, self.get_raw(keys::PROFILES)?)?.unwrap_or_default())
    }

    /// Replaces the stored profiles
    fn save_profiles(&mut self, profiles: &[ProfileRecord]) -> StorageResult<()> {
        self.set_raw(keys::PROFILES, &encode(keys::PROFILES, &profiles)?)
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> StorageResult<Option<T>> {
    raw.map(|raw| {
        serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })
    })
    .transpose()
}
