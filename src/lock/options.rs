// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use bon::Builder;

/// Default mod definition file name.
pub const DEFAULT_MOD_FILE_NAME: &str = "mod.toml";

/// Default lock file name, relative to the workspace.
pub const DEFAULT_LOCK_FILE_NAME: &str = ".mod.cache.json";

/// Default install directory, relative to the workspace.
pub const DEFAULT_INSTALL_DIR: &str = ".modules";

/// Where a workspace keeps its lock and installed mods.
#[derive(Debug, Clone, Builder)]
pub struct WorkspaceLockOptions {
    /// Workspace root
    #[builder(setters(name = with_workspace_path), into)]
    workspace_path: PathBuf,
    /// Mod definition file searched for during the install scan
    #[builder(setters(name = with_mod_file_name), into, default = DEFAULT_MOD_FILE_NAME.to_string())]
    mod_file_name: String,
    /// Lock file name (relative to the workspace)
    #[builder(setters(name = with_lock_file_name), into, default = DEFAULT_LOCK_FILE_NAME.to_string())]
    lock_file_name: String,
    /// Install directory (relative paths resolve against the workspace)
    #[builder(setters(name = with_install_dir), into, default = PathBuf::from(DEFAULT_INSTALL_DIR))]
    install_dir: PathBuf,
    /// Rename legacy `name@vX.Y` folders to `name@vX.Y.0`
    #[builder(setters(name = with_fix_legacy_folders), default = true)]
    fix_legacy_folders: bool,
}

impl WorkspaceLockOptions {
    /// Options with defaults for the workspace at `workspace_path`.
    #[must_use]
    pub fn for_workspace(workspace_path: impl Into<PathBuf>) -> Self {
        Self::builder().with_workspace_path(workspace_path).build()
    }

    #[must_use]
    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    #[must_use]
    pub fn mod_file_name(&self) -> &str {
        &self.mod_file_name
    }

    /// Absolute (workspace-joined) lock file path.
    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        self.workspace_path.join(&self.lock_file_name)
    }

    /// Install root; relative directories resolve against the workspace.
    #[must_use]
    pub fn install_path(&self) -> PathBuf {
        if self.install_dir.is_absolute() {
            self.install_dir.clone()
        } else {
            self.workspace_path.join(&self.install_dir)
        }
    }

    #[must_use]
    pub const fn fix_legacy_folders(&self) -> bool {
        self.fix_legacy_folders
    }
}
