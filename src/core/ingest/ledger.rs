//! Progress ledger.
//!
//! Newline-delimited, append-only log of archive files that were fully
//! processed. The in-memory set mirrors the log for O(1) membership.
//! Duplicate lines are harmless: loading collapses them into the set.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::core::error::{Result, WarcdexError};

/// Durable record of completed files
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    entries: RwLock<HashSet<String>>,
    log: Mutex<File>,
}

impl ProgressLedger {
    /// Open the ledger at `path`, creating an empty log if absent
    ///
    /// With `overwrite` an existing log is truncated and the run starts
    /// over.
    pub fn initialize(path: &Path, overwrite: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ledger_error(path, e))?;
            }
        }

        if overwrite {
            tracing::info!("Resetting progress ledger {:?}", path);
            File::create(path).map_err(|e| ledger_error(path, e))?;
        } else if !path.exists() {
            tracing::info!("Creating progress ledger {:?}", path);
            File::create(path).map_err(|e| ledger_error(path, e))?;
        }

        Self::load(path)
    }

    /// Open an existing ledger
    ///
    /// A missing log is a configuration error, not an empty ledger.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(WarcdexError::ConfigError(format!(
                "Progress file {path:?} does not exist"
            )));
        }
        Self::load(path)
    }

    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ledger_error(path, e))?;
        let mut entries = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| ledger_error(path, e))?;
            let entry = line.trim();
            if !entry.is_empty() {
                entries.insert(entry.to_string());
            }
        }

        let log = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| ledger_error(path, e))?;

        tracing::debug!("Loaded {} ledger entries from {:?}", entries.len(), path);

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
            log: Mutex::new(log),
        })
    }

    /// Whether `entry` was already fully processed
    pub fn contains(&self, entry: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(entry)
    }

    /// Durably record `entry` as fully processed
    ///
    /// Returns `false` without touching the log when it is already
    /// recorded. The line is synced to disk before the entry becomes
    /// visible through [`contains`](Self::contains).
    pub fn append(&self, entry: &str) -> Result<bool> {
        let entry = entry.trim();
        if entry.is_empty() || entry.contains('\n') {
            return Err(WarcdexError::LedgerError(format!(
                "Cannot record {entry:?}: entries must be a single non-empty line"
            )));
        }

        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        if self.contains(entry) {
            return Ok(false);
        }

        log.write_all(format!("{entry}\n").as_bytes())
            .and_then(|_| log.flush())
            .and_then(|_| log.sync_data())
            .map_err(|e| ledger_error(&self.path, e))?;

        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(entry.to_string());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Key under which an archive file is recorded
///
/// Keys are absolute paths with symlinks resolved. A path that cannot be
/// resolved keeps its spelling.
pub fn ledger_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn ledger_error(path: &Path, e: std::io::Error) -> WarcdexError {
    WarcdexError::LedgerError(format!("{path:?}: {e}"))
}
