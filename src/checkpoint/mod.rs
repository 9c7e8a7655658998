//! Snapshot and restore of process-local machine state.
//!
//! A [`Snapshot`] captures every entity a [`MemoryAdapter`] holds, with its
//! current state and transition history, so that machines can resume after a
//! process restart. Guards, actions and entities are not part of a snapshot;
//! they are rebuilt from the graph and the entity builder on resume.
//!
//! Snapshots encode to JSON for readability or to bincode for compactness.

use crate::core::Identifier;
use crate::persistence::{MemoryAdapter, StoredEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Stored state of one identifier at snapshot time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub identifier: Identifier,
    pub entity: StoredEntity,
}

/// Serializable copy of a [`MemoryAdapter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Entries ordered by identifier
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Write the snapshot as JSON, replacing `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let temp = path.with_extension("tmp");
        fs::write(&temp, self.to_json()?)?;
        fs::rename(&temp, path)?;
        debug!(snapshot = %self.id, path = %path.display(), "snapshot saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Check the format version and the consistency of every entry.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(&entry.identifier) {
                return Err(CheckpointError::ValidationFailed(format!(
                    "duplicate entry for {}",
                    entry.identifier
                )));
            }
            if let Some(last) = entry.entity.history.last() {
                if last.to != entry.entity.state {
                    return Err(CheckpointError::ValidationFailed(format!(
                        "{} is in state '{}' but its history ends in '{}'",
                        entry.identifier, entry.entity.state, last.to
                    )));
                }
            }
        }
        Ok(())
    }
}

impl MemoryAdapter {
    /// Copy every stored entity into a new snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, CheckpointError> {
        let entries = self
            .entries()?
            .into_iter()
            .map(|(identifier, entity)| SnapshotEntry { identifier, entity })
            .collect();
        Ok(Snapshot::new(entries))
    }

    /// Build an adapter holding the contents of `snapshot`.
    pub fn restore(snapshot: Snapshot) -> Result<Self, CheckpointError> {
        snapshot.validate()?;
        debug!(snapshot = %snapshot.id, entries = snapshot.len(), "restoring snapshot");
        Ok(Self::from_entries(
            snapshot
                .entries
                .into_iter()
                .map(|entry| (entry.identifier, entry.entity))
                .collect(),
        ))
    }
}
