//! Flat-file store for positions carried from entry scan to exit check.
//!
//! The file is a JSON array of `{"ticker", "stop"}` objects and is rewritten
//! wholesale on every save.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::SavedPosition;

#[derive(Debug, Error)]
pub enum PositionStoreError {
    #[error("positions file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("positions file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty list; a corrupt one is an error.
    pub fn load(&self) -> Result<Vec<SavedPosition>, PositionStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&content).map_err(|source| PositionStoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with `positions`. Creates parent directories if needed.
    pub fn save(&self, positions: &[SavedPosition]) -> Result<(), PositionStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(positions).map_err(|source| {
            PositionStoreError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        tracing::info!(path = %self.path.display(), count = positions.len(), "positions saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> PositionStoreError {
        PositionStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("positions.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("nested/state/positions.json"));

        store
            .save(&[SavedPosition::new("AAA", 10.0), SavedPosition::new("BBB", 20.0)])
            .unwrap();
        store.save(&[SavedPosition::new("CCC", 30.5)]).unwrap();

        assert_eq!(store.load().unwrap(), vec![SavedPosition::new("CCC", 30.5)]);
    }

    #[test]
    fn reads_plain_array_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");
        std::fs::write(&path, r#"[{"ticker": "AAPL", "stop": 180.25}]"#).unwrap();
        let loaded = PositionStore::new(&path).load().unwrap();
        assert_eq!(loaded, vec![SavedPosition::new("AAPL", 180.25)]);
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PositionStore::new(&path).load(),
            Err(PositionStoreError::Json { .. })
        ));
    }
}
