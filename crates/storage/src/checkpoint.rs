// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable batch checkpoints with atomic replace.
//!
//! A checkpoint is a single self-describing JSON document holding everything
//! needed to resume a batch: which items are done, how far the submission
//! cursor got, the partial aggregate, and the ordered per-item results.
//!
//! ## Write protocol
//!
//! ```text
//! serialize (pretty JSON, stable key order)
//!   │
//!   write checkpoint.json.tmp
//!   fsync checkpoint.json.tmp (data durable)
//!   rename → checkpoint.json  (atomic replace)
//!   fsync directory           (rename durable)
//! ```
//!
//! A crash at any point leaves either the previous checkpoint or the new one,
//! never a torn file. The `CheckpointWriter` trait abstracts the I/O so tests
//! can inject failures at each step.

use chrono::{DateTime, Utc};
use pj_core::{DimensionAggregate, ItemKey, OutcomeKind, RunId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Current checkpoint document version.
pub const CHECKPOINT_VERSION: u32 = 1;

const MAX_BAK_FILES: u32 = 3;

/// `checkpoint.json` → `checkpoint.json.tmp`
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Errors from checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("checkpoint version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Persisted outcome of one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub key: ItemKey,
    /// Position of the item in the submission order
    pub index: usize,
    pub status: OutcomeKind,
    #[serde(default)]
    pub detail: String,
}

/// Snapshot of batch progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub run_id: RunId,
    pub updated_at: DateTime<Utc>,
    /// Items a resumed run must skip (succeeded or permanently failed)
    pub processed_keys: BTreeSet<ItemKey>,
    /// Lowest submission index that has not reached a terminal outcome
    pub cursor_index: usize,
    pub aggregate_snapshot: BTreeMap<String, DimensionAggregate>,
    /// Per-item outcomes in submission order
    pub results_so_far: Vec<ItemResult>,
}

impl Checkpoint {
    pub fn new(run_id: RunId) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            run_id,
            updated_at: Utc::now(),
            processed_keys: BTreeSet::new(),
            cursor_index: 0,
            aggregate_snapshot: BTreeMap::new(),
            results_so_far: Vec::new(),
        }
    }

    pub fn is_processed(&self, key: &str) -> bool {
        self.processed_keys.contains(key)
    }

    /// Number of results with the given status.
    pub fn count(&self, status: OutcomeKind) -> usize {
        self.results_so_far
            .iter()
            .filter(|r| r.status == status)
            .count()
    }
}

/// Result of a completed checkpoint write
#[derive(Debug, Clone)]
pub struct CheckpointResult {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Trait abstracting checkpoint I/O for testability.
pub trait CheckpointWriter: Send + Sync + 'static {
    /// Write serialized checkpoint data to a temporary file.
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError>;

    /// Fsync a file to ensure data is durable.
    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError>;

    /// Atomically rename tmp file to final path.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError>;

    /// Fsync directory to make rename durable.
    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError>;
}

/// Production checkpoint writer using real filesystem operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCheckpointWriter;

impl CheckpointWriter for FsCheckpointWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError> {
        fs::rename(from, to)?;
        Ok(())
    }

    #[cfg(unix)]
    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    // Directories cannot be opened for sync on every platform
    #[cfg(not(unix))]
    fn fsync_dir(&self, _path: &Path) -> Result<(), CheckpointError> {
        Ok(())
    }
}

/// Reads and atomically rewrites the checkpoint of one batch output directory.
pub struct CheckpointStore<W: CheckpointWriter = FsCheckpointWriter> {
    writer: W,
    path: PathBuf,
}

impl CheckpointStore<FsCheckpointWriter> {
    pub fn new(path: PathBuf) -> Self {
        Self::with_writer(FsCheckpointWriter, path)
    }
}

impl<W: CheckpointWriter> CheckpointStore<W> {
    /// Create a store with a custom writer (for testing).
    pub fn with_writer(writer: W, path: PathBuf) -> Self {
        Self { writer, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the checkpoint atomically (tmp + fsync + rename + dir fsync).
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<CheckpointResult, CheckpointError> {
        let tmp_path = tmp_sibling(&self.path);

        let mut data = serde_json::to_vec_pretty(checkpoint)?;
        data.push(b'\n');

        self.writer.write_tmp(&tmp_path, &data)?;
        self.writer.fsync_file(&tmp_path)?;
        self.writer.rename(&tmp_path, &self.path)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.writer.fsync_dir(parent)?;
        }

        debug!(
            path = %self.path.display(),
            processed = checkpoint.processed_keys.len(),
            cursor = checkpoint.cursor_index,
            "checkpoint written"
        );
        Ok(CheckpointResult {
            path: self.path.clone(),
            size_bytes: data.len() as u64,
        })
    }

    /// Load the checkpoint if one exists.
    ///
    /// Returns `Ok(None)` if the file doesn't exist or is corrupt. Corrupt
    /// checkpoints are moved to a `.bak` file so the batch starts fresh
    /// instead of failing forever.
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let Some(bytes) = self.read_bytes()? else {
            return Ok(None);
        };

        match parse(&bytes) {
            Err(CheckpointError::Serialize(e)) => {
                let bak_path = rotate_bak_path(&self.path);
                warn!(
                    error = %e,
                    path = %self.path.display(),
                    bak = %bak_path.display(),
                    "corrupt checkpoint, moving to .bak and starting fresh",
                );
                fs::rename(&self.path, &bak_path)?;
                Ok(None)
            }
            other => other.map(Some),
        }
    }

    /// Read the checkpoint without side effects.
    ///
    /// Unlike [`load`](Self::load), a corrupt file is reported as an error
    /// and left in place.
    pub fn read(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        match self.read_bytes()? {
            Some(bytes) => parse(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn read_bytes(&self) -> Result<Option<Vec<u8>>, CheckpointError> {
        match fs::read(&self.path) {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse(bytes: &[u8]) -> Result<Checkpoint, CheckpointError> {
    let checkpoint: Checkpoint = serde_json::from_slice(bytes)?;
    if checkpoint.version > CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion {
            found: checkpoint.version,
            supported: CHECKPOINT_VERSION,
        });
    }
    Ok(checkpoint)
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
