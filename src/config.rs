use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine settings, loadable from TOML.
///
/// ```toml
/// max_depth = 8
/// interaction_mode = true
/// pace_ms = 250
/// snapshot_path = "state/variables.bin"
/// username = "agent7"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum sub-workflow nesting depth.
    pub max_depth: usize,
    /// The session is one workflow among several in a larger interaction.
    pub interaction_mode: bool,
    /// Pacing hint for consumers revealing rows to a human reader.
    pub pace_ms: u64,
    pub snapshot_path: Option<PathBuf>,
    pub username: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            interaction_mode: false,
            pace_ms: 0,
            snapshot_path: None,
            username: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
