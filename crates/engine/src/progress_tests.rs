// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn remaining_excludes_skipped_and_completed() {
    let progress = Progress {
        total: 10,
        skipped: 3,
        completed: 4,
        succeeded: 3,
        failed: 1,
        in_flight: 2,
    };
    assert_eq!(progress.remaining(), 3);
}

#[test]
fn remaining_never_underflows() {
    let progress = Progress {
        total: 1,
        skipped: 1,
        completed: 1,
        ..Progress::default()
    };
    assert_eq!(progress.remaining(), 0);
}
