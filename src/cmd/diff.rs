// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Diff command implementation for modlock.

use std::path::Path;

use anyhow::Context;

use crate::cli::lock::DiffArgs;
use crate::error::Result;
use crate::lock::read_lock_file;
use crate::versions::{DependencyVersionMap, InstallDiff};

/// Main handler for diff command.
///
/// A lock file that does not exist counts as empty.
///
/// # Errors
///
/// Returns an error if either lock file cannot be read or is malformed.
pub fn run_diff_command(args: &DiffArgs) -> Result<()> {
    let diff = diff_lock_files(&args.before, &args.after)?;
    print!("{diff}");
    Ok(())
}

/// Compares the install caches stored in two lock files.
///
/// # Errors
///
/// Returns an error if either lock file cannot be read or is malformed.
pub fn diff_lock_files(before: &Path, after: &Path) -> Result<InstallDiff> {
    let before_cache = read_cache(before)?;
    let after_cache = read_cache(after)?;
    Ok(InstallDiff::between(&before_cache, &after_cache))
}

fn read_cache(path: &Path) -> Result<DependencyVersionMap> {
    let cache = read_lock_file(path)
        .with_context(|| format!("Failed to read lock file {}", path.display()))?;
    Ok(cache.unwrap_or_default())
}
