// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [global]     output_log_level, file_log_level, log_file
//! [workspace]  path, mod_file_name, lock_file_name, install_dir, fix_legacy_folders
//! [loader]     include, exclude, create_default_mod
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::LoaderOptions;
use crate::lock::{
    DEFAULT_INSTALL_DIR, DEFAULT_LOCK_FILE_NAME, DEFAULT_MOD_FILE_NAME, WorkspaceLockOptions,
};
use crate::logging::LogLevel;

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Workspace layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Workspace root.
    pub path: PathBuf,
    /// Mod definition file name.
    pub mod_file_name: String,
    /// Lock file name, relative to the workspace.
    pub lock_file_name: String,
    /// Install directory; relative paths resolve against the workspace.
    pub install_dir: PathBuf,
    /// Rename legacy `name@vX.Y` install folders.
    pub fix_legacy_folders: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            mod_file_name: DEFAULT_MOD_FILE_NAME.to_string(),
            lock_file_name: DEFAULT_LOCK_FILE_NAME.to_string(),
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            fix_legacy_folders: true,
        }
    }
}

impl WorkspaceConfig {
    #[must_use]
    pub fn lock_options(&self) -> WorkspaceLockOptions {
        WorkspaceLockOptions::builder()
            .with_workspace_path(self.path.clone())
            .with_mod_file_name(self.mod_file_name.clone())
            .with_lock_file_name(self.lock_file_name.clone())
            .with_install_dir(self.install_dir.clone())
            .with_fix_legacy_folders(self.fix_legacy_folders)
            .build()
    }
}

/// Resource discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Resource file globs.
    pub include: Vec<String>,
    /// Globs excluded from resource files.
    pub exclude: Vec<String>,
    /// Synthesize a mod for a directory without a definition.
    pub create_default_mod: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.toml".to_string()],
            exclude: vec!["modlock.toml".to_string()],
            create_default_mod: false,
        }
    }
}

impl LoaderConfig {
    /// Loader options; the definition file name comes from `[workspace]`.
    #[must_use]
    pub fn loader_options(&self, mod_file_name: &str) -> LoaderOptions {
        LoaderOptions::builder()
            .with_mod_file_name(mod_file_name)
            .with_include(self.include.clone())
            .with_exclude(self.exclude.clone())
            .with_create_default_mod(self.create_default_mod)
            .build()
    }
}
