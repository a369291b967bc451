// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items and their status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

crate::define_id! {
    /// Stable unique key of a work item.
    ///
    /// For file inputs this is the path as given on the command line, so the
    /// same input set produces the same keys across resumed runs.
    pub struct ItemKey;
}

/// Where the raw record of a work item comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Record text held in memory
    Inline(String),
    /// Record text read from disk when the item is processed
    File(PathBuf),
}

/// Lifecycle status of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl ItemStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Succeeded | ItemStatus::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// `Pending` may jump straight to a terminal status when the outcome is
    /// restored from a checkpoint instead of being recomputed.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::InProgress)
                | (ItemStatus::Pending, ItemStatus::Succeeded)
                | (ItemStatus::Pending, ItemStatus::Failed)
                | (ItemStatus::InProgress, ItemStatus::Succeeded)
                | (ItemStatus::InProgress, ItemStatus::Failed)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::InProgress => write!(f, "in_progress"),
            ItemStatus::Succeeded => write!(f, "succeeded"),
            ItemStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal status transition for {key}: {from} -> {to}")]
pub struct TransitionError {
    pub key: ItemKey,
    pub from: ItemStatus,
    pub to: ItemStatus,
}

/// One unit of input to be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub key: ItemKey,
    pub source: RecordSource,
    status: ItemStatus,
}

impl WorkItem {
    pub fn new(key: impl Into<ItemKey>, source: RecordSource) -> Self {
        Self {
            key: key.into(),
            source,
            status: ItemStatus::Pending,
        }
    }

    pub fn inline(key: impl Into<ItemKey>, text: impl Into<String>) -> Self {
        Self::new(key, RecordSource::Inline(text.into()))
    }

    /// Work item backed by a file; the key is the path itself.
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(
            path.to_string_lossy().into_owned(),
            RecordSource::File(path.to_owned()),
        )
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn transition(&mut self, next: ItemStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                key: self.key.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
