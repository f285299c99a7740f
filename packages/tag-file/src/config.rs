//! Tag file configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// Tag file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagFileConfig {
    /// Chunk size in bytes used when copying file contents during a rewrite
    pub copy_chunk_size: usize,
    /// Number of random characters in temporary file names
    pub temp_suffix_len: usize,
    /// Sync the temporary file to disk before it replaces the original
    pub sync_on_rewrite: bool,
    /// Maximum retry attempts for a rewrite failing with a transient I/O error
    pub max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Copy permission bits of the original file onto the rewritten one
    pub preserve_permissions: bool,
}

impl Default for TagFileConfig {
    fn default() -> Self {
        Self {
            copy_chunk_size: 8192,
            temp_suffix_len: 6,
            sync_on_rewrite: true,
            max_retries: 3,
            retry_delay_ms: 100,
            preserve_permissions: true,
        }
    }
}

impl TagFileConfig {
    /// Parses a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TagError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TagError::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TagError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), TagError> {
        if self.copy_chunk_size == 0 {
            return Err(TagError::InvalidConfig(
                "copy_chunk_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
