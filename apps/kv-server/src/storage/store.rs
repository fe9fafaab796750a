// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed key/value store.
//!
//! Every operation loads the full snapshot from disk through the active
//! [`Codec`], applies the operation in memory and, for mutations, writes
//! the full snapshot back. Nothing is cached between calls.
//!
//! ## Concurrency
//!
//! Whole-file read-modify-write is prone to lost updates: two concurrent
//! mutations can both load the same snapshot and the later save discards
//! the earlier one. Inside one process this is prevented by a mutex held
//! for the full load-mutate-save cycle of each mutation. Readers are not
//! serialized; writes go through a temporary file and an atomic rename, so
//! a reader always sees a complete file. Separate processes writing the
//! same file are NOT coordinated and can still lose updates.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::codec::{Codec, CodecError, Snapshot};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key (or key/value pair) is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Insert collided with an existing key.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Key is not acceptable for any encoding.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// Encoding, decoding or decryption failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error while reading or writing the data file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

pub struct Store {
    path: PathBuf,
    codec: Arc<dyn Codec>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("codec", &self.codec.name())
            .finish()
    }
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, codec: Arc<dyn Codec>) -> Self {
        Self {
            path: path.into(),
            codec,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &'static str {
        self.codec.name()
    }

    // ========== Reads ==========

    /// Full decoded snapshot.
    pub fn get_all(&self) -> StoreResult<Snapshot> {
        self.load()
    }

    /// Values stored under `key`.
    pub fn get_values(&self, key: &str) -> StoreResult<Vec<String>> {
        check_key(key)?;
        self.load()?
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(format!("key {key}")))
    }

    /// `Ok(true)` when `key` exists and holds `value`, `NotFound` otherwise.
    pub fn get_value(&self, key: &str, value: &str) -> StoreResult<bool> {
        check_key(key)?;
        let snapshot = self.load()?;
        let values = snapshot
            .get(key)
            .ok_or_else(|| StoreError::NotFound(format!("key {key}")))?;
        if values.iter().any(|v| v == value) {
            Ok(true)
        } else {
            Err(StoreError::NotFound(format!("value {value} under key {key}")))
        }
    }

    /// Decode the data file without touching it. Used by readiness probes.
    pub fn health_check(&self) -> StoreResult<usize> {
        self.load().map(|snapshot| snapshot.len())
    }

    // ========== Mutations ==========

    /// Add a new record. Fails if the key is already present.
    pub fn insert(&self, key: &str, values: Vec<String>) -> StoreResult<()> {
        check_key(key)?;
        self.mutate(|snapshot| {
            if snapshot.contains_key(key) {
                return Err(StoreError::AlreadyExists(format!("key {key}")));
            }
            snapshot.insert(key.to_string(), values);
            Ok(())
        })
    }

    /// Overwrite the values of an existing record.
    pub fn replace(&self, key: &str, values: Vec<String>) -> StoreResult<()> {
        check_key(key)?;
        self.mutate(|snapshot| match snapshot.get_mut(key) {
            Some(existing) => {
                *existing = values;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("key {key}"))),
        })
    }

    /// Delete a record.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        self.mutate(|snapshot| {
            snapshot
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(format!("key {key}")))
        })
    }

    /// Upsert every record of `entries` in a single write.
    ///
    /// Returns the number of records written.
    pub fn merge(&self, entries: Snapshot) -> StoreResult<usize> {
        for key in entries.keys() {
            check_key(key)?;
        }
        if entries.is_empty() {
            return Ok(0);
        }
        self.mutate(|snapshot| {
            let written = entries.len();
            snapshot.extend(entries);
            Ok(written)
        })
    }

    // ========== File I/O ==========

    /// Run one locked load-mutate-save cycle. Nothing is written if `apply`
    /// or encoding fails.
    fn mutate<T>(&self, apply: impl FnOnce(&mut Snapshot) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut snapshot = self.load()?;
        let result = apply(&mut snapshot)?;
        self.save(&snapshot)?;
        Ok(result)
    }

    fn load(&self) -> StoreResult<Snapshot> {
        match fs::read(&self.path) {
            Ok(raw) => Ok(self.codec.decode(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Snapshot::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Write to a temp sibling first, then rename for atomicity.
    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let raw = self.codec.encode(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&raw)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty"));
    }
    Ok(())
}
