#![forbid(unsafe_code)]

//! Persistence of the selection in a string key/value store.
//!
//! The store is only written on an explicit save. Each field is restored
//! independently: a missing or unreadable entry leaves the corresponding
//! in-memory default untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::selection::Selection;

const TRUE_LITERAL: &str = "true";
const FALSE_LITERAL: &str = "false";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Minimal string key/value backend (e.g. browser `localStorage`).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store used headless and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without counting it as a write.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Number of `set_item` calls since construction.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes += 1;
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// Keys under which the four fields are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub text: String,
    pub family: String,
    pub variant: String,
    pub italic: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            text: "text".to_owned(),
            family: "fontFamily".to_owned(),
            variant: "variant".to_owned(),
            italic: "italic".to_owned(),
        }
    }
}

impl StorageKeys {
    #[must_use]
    pub fn as_array(&self) -> [&str; 4] {
        [&self.text, &self.family, &self.variant, &self.italic]
    }
}

/// Persisted snapshot; every field is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredPreferences {
    pub text: Option<String>,
    pub family: Option<String>,
    pub variant: Option<String>,
    pub italic: Option<bool>,
}

impl StoredPreferences {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.family.is_none() && self.variant.is_none() && self.italic.is_none()
    }

    /// Overwrite only the fields present in the snapshot.
    pub fn apply_to(&self, selection: &mut Selection) {
        if let Some(text) = &self.text {
            selection.text.clone_from(text);
        }
        if let Some(family) = &self.family {
            selection.family.clone_from(family);
        }
        if let Some(variant) = &self.variant {
            selection.variant.clone_from(variant);
        }
        if let Some(italic) = self.italic {
            selection.italic = italic;
        }
    }
}

/// Reads and writes [`StoredPreferences`] through a [`KeyValueStore`].
#[derive(Debug)]
pub struct PreferenceStore<S> {
    backend: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(backend: S, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Read the persisted fields. Never fails; unreadable entries count as
    /// absent.
    pub fn load(&self) -> StoredPreferences {
        let prefs = StoredPreferences {
            text: self.read_non_empty(&self.keys.text),
            family: self.read_non_empty(&self.keys.family),
            variant: self.read_non_empty(&self.keys.variant),
            italic: self.read(&self.keys.italic).map(|v| v == TRUE_LITERAL),
        };
        debug!(
            text = prefs.text.is_some(),
            family = prefs.family.is_some(),
            variant = prefs.variant.is_some(),
            italic = prefs.italic.is_some(),
            "preferences loaded"
        );
        prefs
    }

    /// Write all four fields, overwriting previous values.
    ///
    /// A failing field does not stop the others from being written; the
    /// first error is returned once every field has been attempted.
    pub fn save(&mut self, selection: &Selection) -> Result<(), StorageError> {
        let italic = if selection.italic {
            TRUE_LITERAL
        } else {
            FALSE_LITERAL
        };
        let fields = [
            (&self.keys.text, selection.text.as_str()),
            (&self.keys.family, selection.family.as_str()),
            (&self.keys.variant, selection.variant.as_str()),
            (&self.keys.italic, italic),
        ];
        let mut first_err = None;
        for (key, value) in fields {
            if let Err(err) = self.backend.set_item(key, value) {
                debug!(key = %key, error = %err, "preference write failed");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read preference; using default");
                None
            }
        }
    }

    fn read_non_empty(&self, key: &str) -> Option<String> {
        self.read(key).filter(|v| !v.is_empty())
    }
}
