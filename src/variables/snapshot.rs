use super::{Scope, VariableStore, VariableValue};
use crate::error::StoreError;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// The persisted form of a `VariableStore`.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct VariableSnapshot {
    pub scopes: Vec<(Scope, AHashMap<String, VariableValue>)>,
}

impl VariableSnapshot {
    pub fn capture(store: &VariableStore) -> Self {
        let scopes = Scope::PRECEDENCE
            .iter()
            .map(|scope| (*scope, store.scopes()[scope.index()].clone()))
            .collect();
        Self { scopes }
    }

    /// Overwrites every scope of `store` with the snapshot's contents.
    pub fn apply(self, store: &mut VariableStore) {
        let mut scopes: [AHashMap<String, VariableValue>; 3] = Default::default();
        for (scope, values) in self.scopes {
            scopes[scope.index()] = values;
        }
        store.replace_scopes(scopes);
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = encode_to_vec(self, standard()).map_err(|e| StoreError::Encode(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }
        let mut file = fs::File::create(path).map_err(|source| io_error(path, source))?;
        file.write_all(&bytes)
            .map_err(|source| io_error(path, source))?;
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let mut file = fs::File::open(path).map_err(|source| io_error(path, source))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| io_error(path, source))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl VariableStore {
    /// Writes the current variables to the configured snapshot path.
    /// A store without a snapshot path has nothing to do.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = self.snapshot_path() else {
            return Ok(());
        };
        VariableSnapshot::capture(self).save(path)?;
        debug!(path = %path.display(), variables = self.len(), "Persisted variable snapshot");
        Ok(())
    }

    /// Replaces the store's variables with the persisted snapshot.
    ///
    /// Returns `Ok(false)` when there is no snapshot to restore.
    pub fn restore(&mut self) -> Result<bool, StoreError> {
        let Some(path) = self.snapshot_path().map(Path::to_path_buf) else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        VariableSnapshot::from_file(&path)?.apply(self);
        debug!(path = %path.display(), variables = self.len(), "Restored variable snapshot");
        Ok(true)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
