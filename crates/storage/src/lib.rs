// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable local state for pj: checkpoints and the error journal

mod checkpoint;
mod journal;

pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointResult, CheckpointStore, CheckpointWriter,
    FsCheckpointWriter, ItemResult, CHECKPOINT_VERSION,
};
pub use journal::{ErrorJournal, JournalEntry, JournalError, LogLocation};
