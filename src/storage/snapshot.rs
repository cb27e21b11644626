//! Whole-list persistence for the registry.
//!
//! The record list is written as a single JSON array under one key, and
//! read back whole. There are no partial updates.

use crate::{
    domain::{Config, StudentRecord},
    storage::key_value::{KeyValueStore, StoreError},
};

/// Loads and saves the full, ordered list of records.
pub trait Persistence {
    /// Reads the persisted records.
    ///
    /// Absent data is not an error; it yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be read or decoded.
    fn load(&self) -> Result<Vec<StudentRecord>, LoadError>;

    /// Replaces the persisted records with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be encoded or written.
    fn save(&mut self, records: &[StudentRecord]) -> Result<(), SaveError>;
}

/// Errors that can occur when loading the persisted records.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The backend could not be read.
    #[error("failed to read student records")]
    Store(#[from] StoreError),
    /// The stored value is not a valid record list.
    #[error("stored student records are malformed")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when saving the records.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The backend could not be written.
    #[error("failed to write student records")]
    Store(#[from] StoreError),
    /// The records could not be encoded.
    #[error("failed to encode student records")]
    Json(#[from] serde_json::Error),
}

/// A [`Persistence`] adapter that stores records as a JSON array under one
/// key of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct JsonSnapshot<S> {
    store: S,
    key: String,
    pretty: bool,
}

impl<S: KeyValueStore> JsonSnapshot<S> {
    /// Creates a snapshot stored under `key`, written compactly.
    #[must_use]
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            pretty: false,
        }
    }

    /// Creates a snapshot using the key and formatting from `config`.
    #[must_use]
    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.storage_key()).pretty(config.pretty)
    }

    /// Sets whether the JSON is indented.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The key the snapshot is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> Persistence for JsonSnapshot<S> {
    fn load(&self) -> Result<Vec<StudentRecord>, LoadError> {
        match self.store.get(&self.key)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, records: &[StudentRecord]) -> Result<(), SaveError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(records)?
        } else {
            serde_json::to_string(records)?
        };
        self.store.set(&self.key, &text)?;
        Ok(())
    }
}
