// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input enumeration: glob patterns to file-backed work items.

use pj_core::WorkItem;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid input pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("no input files matched {}", patterns.join(", "))]
    NoMatches { patterns: Vec<String> },
}

/// Expand `patterns` into work items, one per regular file.
///
/// Matches keep glob order within a pattern and pattern order across
/// patterns. A file matched twice is listed once.
pub fn collect(patterns: &[String]) -> Result<Vec<WorkItem>, InputError> {
    let mut seen = HashSet::new();
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|source| InputError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        let before = files.len();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    if seen.insert(path.clone()) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(pattern, error = %e, "skipping unreadable path"),
            }
        }
        if files.len() == before {
            tracing::warn!(pattern, "input pattern matched no files");
        }
    }

    if files.is_empty() {
        return Err(InputError::NoMatches {
            patterns: patterns.to_vec(),
        });
    }
    Ok(files.iter().map(WorkItem::file).collect())
}

#[cfg(test)]
#[path = "inputs_tests.rs"]
mod tests;
