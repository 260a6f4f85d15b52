// File: src/persistence.rs
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode store file: {0}")]
    Encode(bincode::Error),

    #[error("failed to decode store file {path}: {source}")]
    Decode {
        path: PathBuf,
        source: bincode::Error,
    },

    #[error("store is unavailable")]
    Unavailable,
}

/// String key-value persistence, in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, storage_key: &str) -> Result<Option<String>, StoreError>;
    fn store(&self, storage_key: &str, value: &str) -> Result<(), StoreError>;
    /// All storage keys currently held.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory store. Reads and writes can be made to fail, which is how
/// the manager's degrade-to-empty behavior is exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw access for tests and seeding.
    pub fn raw(&self, storage_key: &str) -> Option<String> {
        lock(&self.entries).get(storage_key).cloned()
    }

    pub fn insert_raw(&self, storage_key: &str, value: &str) {
        lock(&self.entries).insert(storage_key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, storage_key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(lock(&self.entries).get(storage_key).cloned())
    }

    fn store(&self, storage_key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        lock(&self.entries).insert(storage_key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}

/// The on-disk layout of a [`FileStore`].
#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
struct SerializableState {
    entries: BTreeMap<String, String>,
}

/// A key-value store kept in memory and written through to a single
/// bincode file on every `store`. Each write replaces the file atomically.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store;
    /// an unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            load_from_disk(&path)?.entries
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "opened vocabulary store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Like [`FileStore::open`], but a corrupt file starts an empty store.
    /// The file on disk is left alone until the next write.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(error) => {
                warn!(path = %path.display(), %error, "vocabulary store unreadable, starting empty");
                Self {
                    path,
                    entries: Mutex::new(BTreeMap::new()),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, storage_key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(storage_key).cloned())
    }

    fn store(&self, storage_key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        entries.insert(storage_key.to_string(), value.to_string());
        // Written while still holding the lock so file contents follow call order.
        let state = SerializableState {
            entries: entries.clone(),
        };
        save_to_disk(&state, &self.path)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}

fn save_to_disk(state: &SerializableState, path: &Path) -> Result<(), StoreError> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, state).map_err(StoreError::Encode)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn load_from_disk(path: &Path) -> Result<SerializableState, StoreError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    bincode::deserialize_from(reader).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
