//! Snapshot persistence for the workout store.
//!
//! The persisted medium is an opaque key/value byte slot behind the
//! [`Snapshot`] trait. The whole store is serialized under a single fixed
//! key; a missing or unreadable slot is "no prior history", never an error.
//! Write failures propagate to the caller, which does not retry.

use crate::{Result, WorkoutRecord, WorkoutStore};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Slot name the serialized store lives under.
pub const HISTORY_KEY: &str = "workouts";

/// An opaque byte-oriented key/value store.
pub trait Snapshot {
    /// Read the value under `key`, or `None` if absent/unreadable.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Write the value under `key`. Errors propagate to the caller.
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

impl<T: Snapshot + ?Sized> Snapshot for &mut T {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(key, bytes)
    }
}

/// File-backed snapshot slot: each key is a JSON file under the data
/// directory, written atomically with file locking.
pub struct HistoryFile {
    dir: PathBuf,
}

impl HistoryFile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Snapshot for HistoryFile {
    /// Read with a shared lock. Any failure is treated as an absent slot.
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.key_path(key);
        if !path.exists() {
            tracing::debug!("No snapshot at {:?}", path);
            return None;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open snapshot {:?}: {}. Treating as empty.", path, e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock snapshot {:?}: {}. Treating as empty.", path, e);
            return None;
        }

        let mut bytes = Vec::new();
        let mut reader = std::io::BufReader::new(&file);
        let outcome = reader.read_to_end(&mut bytes);
        let _ = file.unlock();

        match outcome {
            Ok(_) => Some(bytes),
            Err(e) => {
                tracing::warn!("Failed to read snapshot {:?}: {}. Treating as empty.", path, e);
                None
            }
        }
    }

    /// Atomic write: temp file in the same directory, exclusive lock, sync,
    /// rename over the original.
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(bytes)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| crate::Error::Io(e.error))?;

        tracing::debug!("Wrote snapshot to {:?}", path);
        Ok(())
    }
}

/// In-memory snapshot slot, for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshot {
    slots: std::collections::HashMap<String, Vec<u8>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Snapshot for MemorySnapshot {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.get(key).cloned()
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.slots.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Serialize the store's records and write them under [`HISTORY_KEY`].
pub fn save<S: Snapshot>(slot: &mut S, store: &WorkoutStore) -> Result<()> {
    let bytes = serde_json::to_vec(&store.to_records())?;
    slot.write(HISTORY_KEY, &bytes)?;
    tracing::debug!("Persisted {} workouts", store.len());
    Ok(())
}

/// Load previously persisted records.
///
/// An absent slot or unparseable bytes yield the empty history.
pub fn load<S: Snapshot>(slot: &S) -> Vec<WorkoutRecord> {
    let bytes = match slot.read(HISTORY_KEY) {
        Some(bytes) => bytes,
        None => return Vec::new(),
    };

    match serde_json::from_slice::<Vec<WorkoutRecord>>(&bytes) {
        Ok(records) => {
            tracing::debug!("Loaded {} persisted workouts", records.len());
            records
        }
        Err(e) => {
            tracing::warn!("Failed to parse workout history: {}. Starting empty.", e);
            Vec::new()
        }
    }
}
