// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup: stderr plus an optional log file in the output directory.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter from `PJ_LOG`, then `RUST_LOG`, else `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    crate::env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// With `log_file`, events are also written there through a non-blocking
/// writer; the returned guard must live until exit so buffered lines flush.
pub fn init(log_file: Option<&Path>) -> std::io::Result<Option<WorkerGuard>> {
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let Some(path) = log_file else {
        let _ = tracing_subscriber::registry()
            .with(env_filter("warn"))
            .with(stderr)
            .try_init();
        return Ok(None);
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other(format!("not a file path: {}", path.display())))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init();
    Ok(Some(guard))
}
