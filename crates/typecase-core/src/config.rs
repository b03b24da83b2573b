#![forbid(unsafe_code)]

//! Widget configuration.
//!
//! Loaded from JSON by the host page; every field is optional:
//!
//! ```json
//! { "manifest_url": "/static/fonts.json", "storage_keys": { "text": "preview.text" } }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prefs::StorageKeys;

pub const DEFAULT_MANIFEST_URL: &str = "/fonts.json";
pub const DEFAULT_HEADING: &str = "Font Preview";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse preview config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid preview config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Location of the font manifest.
    pub manifest_url: String,
    /// Heading rendered above the controls.
    pub heading: String,
    pub storage_keys: StorageKeys,
    /// Move the variant to the new family's first variant when the family
    /// changes. Off by default: the variant selection is left as-is.
    pub reconcile_variant_on_family_change: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_owned(),
            heading: DEFAULT_HEADING.to_owned(),
            storage_keys: StorageKeys::default(),
            reconcile_variant_on_family_change: false,
        }
    }
}

impl PreviewConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_url.trim().is_empty() {
            return Err(ConfigError::Invalid("manifest_url must not be empty".into()));
        }
        let keys = self.storage_keys.as_array();
        if let Some(empty) = keys.iter().position(|k| k.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "storage key #{empty} must not be empty"
            )));
        }
        let distinct: BTreeSet<&str> = keys.iter().copied().collect();
        if distinct.len() != keys.len() {
            return Err(ConfigError::Invalid("storage keys must be distinct".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let config = PreviewConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(config.manifest_url, "/fonts.json");
        assert_eq!(config.storage_keys.family, "fontFamily");
    }

    #[test]
    fn partial_storage_keys_merge_with_defaults() {
        let config =
            PreviewConfig::from_json_str(r#"{"storage_keys": {"text": "preview.text"}}"#).unwrap();
        assert_eq!(config.storage_keys.text, "preview.text");
        assert_eq!(config.storage_keys.italic, "italic");
    }

    #[test]
    fn rejects_empty_manifest_url() {
        let err = PreviewConfig::from_json_str(r#"{"manifest_url": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn rejects_duplicate_storage_keys() {
        let err = PreviewConfig::from_json_str(r#"{"storage_keys": {"text": "italic"}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid preview config: storage keys must be distinct");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PreviewConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
