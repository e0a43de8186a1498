// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Workspace lock.
//!
//! ```text
//! WorkspaceLock::load(options)
//!   1. read <workspace>/.mod.cache.json     absent -> empty, malformed -> error
//!   2. scan <install-root>/**/mod.toml      name@suffix folders (legacy renamed)
//!   3. fold in local-path entries           directory must exist
//!   4. reconcile                            install_cache | missing_versions
//!
//! lookups   get_mod, find_mod, get_locked_mod_version, ensure_locked_mod_version
//! status    incomplete, requires_full_reinstall, lock_file_exists
//! persist   save()   (atomic, install cache only)
//! ```

pub mod options;
pub mod scan;
pub mod workspace;


pub use options::{
    DEFAULT_INSTALL_DIR, DEFAULT_LOCK_FILE_NAME, DEFAULT_MOD_FILE_NAME, WorkspaceLockOptions,
};
pub use scan::canonical_suffix;
pub use workspace::{WorkspaceLock, read_lock_file};
