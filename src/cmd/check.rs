// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Check command implementation for modlock.
//!
//! ```text
//! WorkspaceLock::load --> status (missing, schema)
//!        |
//!        v
//! load_mod(dir) --> mods, resources, warnings
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::cli::lock::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::loader::{ParseContext, load_mod};
use crate::lock::WorkspaceLock;
use crate::modconfig::{Diagnostics, TomlModParser};

/// Outcome of a successful workspace load.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Root mod name.
    pub mod_name: String,
    /// Mods in the loaded tree, root included.
    pub mod_count: usize,
    /// Resources visible from the root.
    pub resource_count: usize,
    pub warnings: Diagnostics,
    /// Locked dependencies that are not installed, as `name@version (in parent)`.
    pub missing: Vec<String>,
    /// Some lock entry predates the current schema.
    pub stale_schema: bool,
}

impl CheckReport {
    /// `true` when the workspace is usable as locked.
    #[must_use]
    pub fn is_clean(&self, deny_warnings: bool) -> bool {
        let warnings_ok = !deny_warnings || self.warnings.is_empty();
        self.missing.is_empty() && !self.stale_schema && warnings_ok
    }
}

/// Main handler for check command.
///
/// # Errors
///
/// Returns an error if the workspace fails to load, if locked dependencies
/// are missing or stale, or, with `--deny-warnings`, if warnings were
/// reported.
pub async fn run_check_command(args: &CheckArgs, config: &Config) -> Result<()> {
    let report = check_workspace(args, config).await?;

    println!(
        "{}: {} mods, {} resources",
        report.mod_name, report.mod_count, report.resource_count
    );
    for diagnostic in report.warnings.iter() {
        println!("{diagnostic}");
    }
    for entry in &report.missing {
        println!("missing: {entry}");
    }
    if report.stale_schema {
        println!("lock file predates the current format; run 'mod install' to reinstall");
    }

    if report.is_clean(args.deny_warnings) {
        Ok(())
    } else {
        Err(anyhow!("workspace check failed"))
    }
}

/// Loads the lock and the mod tree rooted at `args.dir`.
///
/// # Errors
///
/// Returns the lock or load error. Missing-dependency errors carry a hint
/// to reinstall.
pub async fn check_workspace(args: &CheckArgs, config: &Config) -> Result<CheckReport> {
    let lock = WorkspaceLock::load(config.lock_options())?;

    let missing: Vec<String> = lock
        .missing_versions()
        .entries()
        .map(|(parent, resolved)| format!("{} (in {parent})", resolved.dependency_path()))
        .collect();
    let stale_schema = lock.requires_full_reinstall();
    if !missing.is_empty() {
        warn!(count = missing.len(), "Locked dependencies are not installed");
    }

    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| lock.workspace_path().to_path_buf());
    let dir = resolve_dir(dir, &lock);

    let ctx = ParseContext::new(
        Arc::new(lock),
        Arc::new(TomlModParser::new()),
        config.loader_options(),
    );

    let loaded = load_mod(dir, ctx).await.map_err(|e| {
        let hint = if e.is_missing_dependency() {
            "Dependencies are missing; run 'mod install' first"
        } else {
            "Failed to load mod"
        };
        anyhow::Error::new(e).context(hint)
    })?;

    info!(
        module = %loaded.module,
        mods = loaded.module.mod_count(),
        warnings = loaded.warnings.len(),
        "Workspace check finished"
    );

    Ok(CheckReport {
        mod_name: loaded.module.name.clone(),
        mod_count: loaded.module.mod_count(),
        resource_count: loaded.module.resources.len(),
        warnings: loaded.warnings,
        missing,
        stale_schema,
    })
}

/// Relative directories are taken from the workspace root.
fn resolve_dir(dir: PathBuf, lock: &WorkspaceLock) -> PathBuf {
    if dir.is_absolute() || dir.starts_with(lock.workspace_path()) {
        dir
    } else {
        lock.workspace_path().join(dir)
    }
}
