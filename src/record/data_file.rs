//! Data File
//!
//! Owns the single append-only file handle: tail appends, positional reads,
//! fsync according to the configured `SyncStrategy`, and tail truncation.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{CaskError, Result};

/// The append-only data file
#[derive(Debug)]
pub struct DataFile {
    /// Location on disk (for logging)
    path: PathBuf,
    /// Read/write handle; all writes go to `len`
    file: File,
    /// Logical length: offset where the next record is appended
    len: u64,
    /// When to fsync after an append
    sync_strategy: SyncStrategy,
    /// Appends since the last fsync
    unsynced_writes: usize,
    /// Opened without write access
    read_only: bool,
}

impl DataFile {
    /// Open the data file at `path`, creating it if missing
    ///
    /// Returns the handle and whether the file already existed.
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<(Self, bool)> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);

        let (file, existed) = match options.clone().create_new(true).open(path) {
            Ok(file) => (file, false),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => (options.open(path)?, true),
            Err(e) => return Err(e.into()),
        };

        Ok((Self::from_file(path, file, sync_strategy, false)?, existed))
    }

    /// Open an existing data file without write access
    ///
    /// Appends fail with `CaskError::ReadOnly`; nothing is created or
    /// truncated.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_file(path, file, SyncStrategy::Never, true)
    }

    fn from_file(
        path: &Path,
        file: File,
        sync_strategy: SyncStrategy,
        read_only: bool,
    ) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            sync_strategy,
            unsynced_writes: 0,
            read_only,
        })
    }

    /// Append encoded bytes at the tail
    ///
    /// Returns the offset the bytes were written at. If the write (or the
    /// fsync demanded by the strategy) fails, the file is cut back to its
    /// previous length so no torn bytes are left behind.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        if self.read_only {
            return Err(CaskError::ReadOnly);
        }

        let position = self.len;

        if let Err(e) = self.write_at_tail(position, bytes) {
            tracing::warn!(
                path = %self.path.display(),
                position,
                error = %e,
                "append failed, rolling back data file tail"
            );
            if let Err(rollback) = self.file.set_len(position) {
                tracing::warn!(error = %rollback, "failed to roll back data file tail");
            }
            return Err(e);
        }

        self.len = position + bytes.len() as u64;
        Ok(position)
    }

    fn write_at_tail(&mut self, position: u64, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;

        self.unsynced_writes += 1;
        let should_sync = match self.sync_strategy {
            SyncStrategy::Never => false,
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNWrites { count } => self.unsynced_writes >= count,
        };
        if should_sync {
            self.sync()?;
        }

        Ok(())
    }

    /// Read exactly `size` bytes starting at `position`
    pub fn read_at(&mut self, position: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.file.seek(SeekFrom::Start(position))?;
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Force sync to disk. A no-op for read-only files.
    pub fn sync(&mut self) -> Result<()> {
        if self.read_only {
            return Ok(());
        }
        self.file.sync_all()?;
        self.unsynced_writes = 0;
        Ok(())
    }

    /// Copy every byte from `from` to the end of the file into a new
    /// sidecar file next to the data file, returning its path
    ///
    /// Sidecars are named `<data file>.torn-<from>`, with a numeric suffix
    /// added if that name is taken. Existing files are never overwritten.
    pub fn preserve_tail(&mut self, from: u64) -> Result<PathBuf> {
        let base = sidecar_name(&self.path, from);
        let mut target = PathBuf::from(&base);
        let mut attempt = 0u32;

        let mut sidecar = loop {
            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                    let mut name = base.clone();
                    name.push(format!(".{}", attempt));
                    target = PathBuf::from(name);
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.file.seek(SeekFrom::Start(from))?;
        let mut source = &self.file;
        io::copy(&mut source, &mut sidecar)?;
        sidecar.sync_all()?;

        Ok(target)
    }

    /// Cut the file down to `len` bytes (drops a torn tail)
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        if self.read_only {
            return Err(CaskError::ReadOnly);
        }
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.len = len;
        self.unsynced_writes = 0;
        Ok(())
    }

    /// Logical length of the file
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw handle, used by recovery to scan the file
    pub fn file(&self) -> &File {
        &self.file
    }
}

fn sidecar_name(path: &Path, from: u64) -> OsString {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".torn-{}", from));
    name
}
