use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::RunError;

/// Single-value store for the kind name of the last notified error. Absent
/// file means no error is outstanding. Read and written only once per run,
/// by the orchestrator, after all fetch work completes.
pub struct MarkerStore {
    path: PathBuf,
}

impl MarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<Option<String>, RunError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let kind = content.trim().to_string();
                if kind.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(kind))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RunError::StoreCorrupt(format!(
                "cannot read marker {}: {e}",
                self.path.display()
            ))),
        }
    }

    pub fn set(&self, kind: &str) -> Result<(), RunError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RunError::StoreCorrupt(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, kind).map_err(|e| {
            RunError::StoreCorrupt(format!("cannot write marker {}: {e}", self.path.display()))
        })
    }

    pub fn clear(&self) -> Result<(), RunError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RunError::StoreCorrupt(format!(
                "cannot clear marker {}: {e}",
                self.path.display()
            ))),
        }
    }
}
