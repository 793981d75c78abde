// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use pagewerk_core::AppConfig;

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir().join("pagewerk");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Return a subdirectory inside `data_dir` (e.g. "documents").
pub fn data_subdir(data_dir: &Path, name: &str) -> PathBuf {
    let dir = data_dir.join(name);
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Where encoded documents go when no output path is given.
pub fn output_dir(data_dir: &Path, config: &AppConfig) -> PathBuf {
    match &config.output_dir {
        Some(dir) => dir.clone(),
        None => data_subdir(data_dir, "documents"),
    }
}

fn base_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
