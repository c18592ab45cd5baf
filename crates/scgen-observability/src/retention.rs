// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Retention policy for timestamped log run folders (`run_YYYYmmdd_HHMMSS`)

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

/// Run folder timestamp format
pub const RUN_FOLDER_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Folder name for a run started at `started`
pub fn run_folder_name(started: DateTime<Utc>) -> String {
    format!("run_{}", started.format(RUN_FOLDER_FORMAT))
}

fn parse_run_folder(dir_name: &str) -> Option<DateTime<Utc>> {
    let timestamp = dir_name.strip_prefix("run_")?;
    let naive = NaiveDateTime::parse_from_str(timestamp, RUN_FOLDER_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`. Directories that are not run folders are left alone.
///
/// Returns the removed paths.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    if !base_log_dir.exists() {
        return Ok(Vec::new());
    }

    let cutoff = now - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(started) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_run_folder)
        {
            runs.push((path, started));
        }
    }

    // newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = Vec::new();
    for (index, (path, started)) in runs.into_iter().enumerate() {
        if index < retention_runs && started >= cutoff {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => removed.push(path),
            Err(e) => warn!("Failed to remove old log directory {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
