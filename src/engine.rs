//! Engine Module
//!
//! The storage engine that ties the data file and the key directory together.
//!
//! ## Responsibilities
//! - Rebuild the key directory from the data file on open
//! - Append records and index them only once the write succeeded
//! - Serve point reads with a single seek
//! - Enforce the Ready → Closed lifecycle

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::keydir::{KeyDir, KeyEntry};
use crate::record::{DataFile, Record, RecordHeader, Recovery, RecoveryResult};

/// The main storage engine
///
/// ## Concurrency Model
///
/// The data file cursor and the key directory are shared mutable state, so
/// every operation (get/set/sync/close) runs under one `Mutex`. A `DiskStore`
/// is `Send + Sync` and can be shared behind an `Arc`; calls are simply
/// serialized. Nothing stops a second process from opening the same file.
///
/// ## Lifecycle
///
/// `open` either returns a fully recovered, ready store or an error; a store
/// with a partially built index is never handed out. After `close`, every
/// operation fails with `CaskError::Closed`.
pub struct DiskStore {
    /// Store configuration
    config: Config,

    /// Ready or closed
    state: Mutex<State>,
}

enum State {
    Ready(Store),
    Closed,
}

impl State {
    fn ready(&self) -> Result<&Store> {
        match self {
            State::Ready(store) => Ok(store),
            State::Closed => Err(CaskError::Closed),
        }
    }

    fn ready_mut(&mut self) -> Result<&mut Store> {
        match self {
            State::Ready(store) => Ok(store),
            State::Closed => Err(CaskError::Closed),
        }
    }
}

/// Everything an open store owns
struct Store {
    data_file: DataFile,
    keydir: KeyDir,
    recovery: RecoveryResult,
    torn_tail_path: Option<PathBuf>,
}

/// Point-in-time statistics of an open store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of distinct keys in the key directory
    pub live_keys: usize,

    /// Current data file length in bytes (live and superseded records)
    pub file_len: u64,

    /// What recovery found when the store was opened
    pub recovery: RecoveryResult,

    /// Where the bytes cut from the end of the data file were saved
    pub torn_tail_path: Option<PathBuf>,
}

impl DiskStore {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate config, create parent directories
    /// 2. Open the data file, creating it if missing
    /// 3. Replay an existing file into the key directory
    /// 4. Move bytes after the last complete record to a sidecar file and
    ///    cut them from the data file
    ///
    /// A read-only store skips creation and step 4: the file is left as is
    /// and only the complete records are indexed.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let (mut data_file, existed) = if config.read_only {
            (DataFile::open_read_only(&config.path)?, true)
        } else {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            DataFile::open(&config.path, config.sync_strategy)?
        };

        let mut torn_tail_path = None;
        let (keydir, recovery) = if existed {
            let (keydir, recovery) = Recovery::recover(data_file.file())?;

            if recovery.was_truncated && !config.read_only {
                let saved = data_file.preserve_tail(recovery.valid_len)?;
                tracing::warn!(
                    path = %config.path.display(),
                    valid_len = recovery.valid_len,
                    bytes_discarded = recovery.bytes_discarded,
                    saved_to = %saved.display(),
                    "data file ends in an incomplete record, moved trailing bytes aside"
                );
                data_file.truncate(recovery.valid_len)?;
                torn_tail_path = Some(saved);
            } else if recovery.was_truncated {
                tracing::warn!(
                    path = %config.path.display(),
                    valid_len = recovery.valid_len,
                    bytes_discarded = recovery.bytes_discarded,
                    "data file ends in an incomplete record, ignored in read-only mode"
                );
            }

            tracing::info!(
                path = %config.path.display(),
                records = recovery.records_scanned,
                keys = recovery.live_keys,
                file_len = recovery.valid_len,
                read_only = config.read_only,
                "recovered data file"
            );
            (keydir, recovery)
        } else {
            tracing::info!(path = %config.path.display(), "created new data file");
            (KeyDir::new(), RecoveryResult::default())
        };

        Ok(Self {
            config,
            state: Mutex::new(State::Ready(Store {
                data_file,
                keydir,
                recovery,
                torn_tail_path,
            })),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Get the latest value for `key`
    ///
    /// Returns `Ok(None)` when the key was never set; an empty string is a
    /// legitimate value.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.state.lock();
        let store = state.ready_mut()?;

        let Some(entry) = store.keydir.get(key) else {
            return Ok(None);
        };

        let bytes = store
            .data_file
            .read_at(entry.position, entry.total_size as usize)
            .map_err(|e| match e {
                CaskError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
                    stale_entry(key, &entry, "data file ends before the record does")
                }
                other => other,
            })?;

        let header = RecordHeader::decode(&bytes)?;
        if header.record_size() != entry.total_size as u64 {
            return Err(stale_entry(
                key,
                &entry,
                format!(
                    "record header declares {} bytes, index expects {}",
                    header.record_size(),
                    entry.total_size
                ),
            ));
        }

        let record = Record::decode(&bytes)?;
        if record.key != key {
            return Err(stale_entry(
                key,
                &entry,
                format!("record belongs to key {:?}", record.key),
            ));
        }

        Ok(Some(record.value))
    }

    /// Set `key` to `value`
    ///
    /// Steps:
    /// 1. Stamp the record with the current time (seconds)
    /// 2. Append it at the data file tail
    /// 3. Point the key directory at it, replacing any older entry
    ///
    /// If the append fails the key directory is left untouched. Read-only
    /// stores fail with `CaskError::ReadOnly`.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let store = state.ready_mut()?;

        let record = Record::new(unix_epoch_now()?, key, value);
        let bytes = record.encode()?;
        let position = store.data_file.append(&bytes)?;

        let Record { timestamp, key, .. } = record;
        tracing::trace!(key = %key, position, size = bytes.len(), "appended record");
        store
            .keydir
            .put(key, KeyEntry::new(position, bytes.len() as u32, timestamp));

        Ok(())
    }

    /// Force the data file to stable storage
    pub fn sync(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.ready_mut()?.data_file.sync()
    }

    /// Close the store
    ///
    /// Syncs the data file and releases the handle. The store is closed even
    /// if the final sync fails; the sync error is still returned.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();

        match std::mem::replace(&mut *state, State::Closed) {
            State::Ready(mut store) => {
                let result = store.data_file.sync();
                tracing::info!(
                    path = %store.data_file.path().display(),
                    keys = store.keydir.len(),
                    file_len = store.data_file.len(),
                    "closed data file"
                );
                result
            }
            State::Closed => Err(CaskError::Closed),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether `key` has a value
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.state.lock().ready()?.keydir.contains_key(key))
    }

    /// Number of live keys
    pub fn len(&self) -> Result<usize> {
        Ok(self.state.lock().ready()?.keydir.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.state.lock().ready()?.keydir.is_empty())
    }

    /// All live keys, in no particular order
    pub fn keys(&self) -> Result<Vec<String>> {
        let state = self.state.lock();
        let store = state.ready()?;
        Ok(store.keydir.keys().map(str::to_owned).collect())
    }

    /// Key count, file size and the recovery report
    pub fn stats(&self) -> Result<StoreStats> {
        let state = self.state.lock();
        let store = state.ready()?;
        Ok(StoreStats {
            live_keys: store.keydir.len(),
            file_len: store.data_file.len(),
            recovery: store.recovery.clone(),
            torn_tail_path: store.torn_tail_path.clone(),
        })
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), State::Closed)
    }

    /// Get the data file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Sync a store that was dropped without `close`
impl Drop for DiskStore {
    fn drop(&mut self) {
        if let State::Ready(store) = self.state.get_mut() {
            if let Err(e) = store.data_file.sync() {
                tracing::warn!(
                    path = %self.config.path.display(),
                    error = %e,
                    "failed to sync data file on drop"
                );
            }
        }
    }
}

fn stale_entry(key: &str, entry: &KeyEntry, reason: impl Into<String>) -> CaskError {
    CaskError::StaleIndexEntry {
        key: key.to_string(),
        position: entry.position,
        reason: reason.into(),
    }
}

fn unix_epoch_now() -> Result<u32> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CaskError::Timestamp(e.to_string()))?
        .as_secs();

    u32::try_from(secs).map_err(|_| {
        CaskError::Timestamp(format!("{} seconds since epoch does not fit in u32", secs))
    })
}
