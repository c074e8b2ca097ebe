// src/persistence.rs - Position snapshot persistence
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// The on-disk record of where the device physically is. Written wholesale
/// after every completed or failed motion operation, read once at boot.
/// After a power loss mid-move it is stale relative to the true position;
/// recovery is the explicit home cycle, not automatic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Derived actuator lengths, in axis order.
    pub lengths: [f64; 2],
}

/// Snapshot store at one fixed path. No append log: each save overwrites
/// the previous snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, snapshot: &PersistedSnapshot) -> io::Result<()> {
        let json = serde_json::to_string(snapshot).map_err(io::Error::other)?;
        std::fs::write(&self.path, json)
    }

    /// Load the snapshot if one exists. A missing file is a normal first
    /// boot; an unreadable one is reported and treated the same way.
    pub fn load(&self) -> Option<PersistedSnapshot> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("failed to read snapshot {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("discarding corrupt snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("position.json"));

        let snapshot = PersistedSnapshot {
            x: 120.5,
            y: 310.0,
            z: -1.0,
            lengths: [334.21, 512.78],
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), Some(snapshot));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("position.json"));

        let first = PersistedSnapshot { x: 1.0, y: 2.0, z: 0.0, lengths: [1.0, 2.0] };
        let second = PersistedSnapshot { x: 9.0, y: 8.0, z: 1.0, lengths: [9.0, 8.0] };
        store.save(&first).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load(), Some(second));
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("position.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(SnapshotStore::new(path).load(), None);
    }
}
