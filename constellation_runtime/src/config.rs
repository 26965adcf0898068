//! Runtime configuration.
//!
//! Every field has a default, so an absent file or a partial one is fine.
//! Unknown keys are rejected to catch typos.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use constellation_engine::domain::EngineConstants;

/// Key the host progress record is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "valentine_progress";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub storage_key: String,
    /// Pause between a completion and its note appearing, in milliseconds.
    pub note_reveal_delay_ms: u64,
    /// Time the finished phrase stays on screen before `AllSolved` fires.
    pub finale_admire_ms: u64,
    pub constants: EngineConstants,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            note_reveal_delay_ms: 1500,
            finale_admire_ms: 8000,
            constants: EngineConstants::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config =
            RuntimeConfig::from_json(r#"{"note_reveal_delay_ms": 10, "constants": {"touch_threshold": 9.0}}"#)
                .unwrap();
        assert_eq!(config.note_reveal_delay_ms, 10);
        assert_eq!(config.finale_admire_ms, 8000);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.constants.touch_threshold, 9.0);
        assert_eq!(config.constants.guide_max, 90.0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = RuntimeConfig::from_json(r#"{"storage_kye": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");
        std::fs::write(&path, r#"{"storage_key": "card"}"#).unwrap();
        assert_eq!(RuntimeConfig::load(&path).unwrap().storage_key, "card");
    }
}
