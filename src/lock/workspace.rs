// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::options::WorkspaceLockOptions;
use super::scan::{InstalledVersions, scan_install_dir};
use crate::error::{DependencyError, LockError, ModError, ModResult};
use crate::versions::{
    DependencyTree, DependencyVersion, DependencyVersionMap, ModVersionConstraint,
    ResolvedVersionConstraint,
};

/// What is locked in a workspace, and whether it is actually installed.
///
/// Built once per workspace load and read-only afterwards, so it can be
/// shared across concurrent load tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WorkspaceLock {
    options: WorkspaceLockOptions,
    lock_file_exists: bool,
    /// Locked entries confirmed on disk. The only persisted state.
    install_cache: DependencyVersionMap,
    /// Locked entries whose installation is missing.
    missing_versions: DependencyVersionMap,
    /// Folder suffixes found under the install root.
    installed: InstalledVersions,
    /// Local-path dependencies whose directory exists.
    installed_local: BTreeSet<PathBuf>,
}

impl WorkspaceLock {
    /// Reads the lock, scans the install directory and reconciles the two.
    ///
    /// A missing lock file yields an empty lock.
    ///
    /// # Errors
    ///
    /// Returns `LockError` if the lock file cannot be read or is malformed,
    /// and an error if the install directory cannot be walked.
    pub fn load(options: WorkspaceLockOptions) -> ModResult<Self> {
        let lock_path = options.lock_file_path();
        let (cache, lock_file_exists) = match read_lock_file(&lock_path)? {
            Some(cache) => (cache, true),
            None => (DependencyVersionMap::new(), false),
        };

        let installed = scan_install_dir(
            &options.install_path(),
            options.mod_file_name(),
            options.fix_legacy_folders(),
            &cache,
        )?;

        let mut lock = Self {
            options,
            lock_file_exists,
            install_cache: DependencyVersionMap::new(),
            missing_versions: DependencyVersionMap::new(),
            installed,
            installed_local: BTreeSet::new(),
        };
        lock.reconcile(cache);

        debug!(
            lock_file = %lock_path.display(),
            installed = lock.install_cache.len(),
            missing = lock.missing_versions.len(),
            "Loaded workspace lock"
        );
        Ok(lock)
    }

    /// Builds a lock from an in-memory cache without touching the disk.
    ///
    /// Every entry is treated as installed.
    #[must_use]
    pub fn from_cache(options: WorkspaceLockOptions, install_cache: DependencyVersionMap) -> Self {
        let mut installed = InstalledVersions::new();
        let mut installed_local = BTreeSet::new();
        for (_, resolved) in install_cache.entries() {
            match (&resolved.version, resolved.version.install_dir_suffix()) {
                (DependencyVersion::LocalPath(path), _) => {
                    installed_local.insert(path.clone());
                }
                (_, Some(suffix)) => {
                    installed
                        .entry(resolved.name.clone())
                        .or_default()
                        .insert(suffix);
                }
                (_, None) => {}
            }
        }
        Self {
            options,
            lock_file_exists: !install_cache.is_empty(),
            install_cache,
            missing_versions: DependencyVersionMap::new(),
            installed,
            installed_local,
        }
    }

    /// Splits `cache` into confirmed and missing entries.
    fn reconcile(&mut self, cache: DependencyVersionMap) {
        for (_, resolved) in cache.entries() {
            if let DependencyVersion::LocalPath(path) = &resolved.version
                && self.local_dir(path).is_dir()
            {
                self.installed_local.insert(path.clone());
            }
        }

        for (parent, resolved) in cache.entries() {
            if self.contains_mod(&resolved.name, &resolved.version) {
                self.install_cache.add(parent, resolved.clone());
            } else {
                warn!(
                    parent = %parent,
                    dependency = %resolved.dependency_path(),
                    "Locked dependency is not installed"
                );
                self.missing_versions.add(parent, resolved.clone());
            }
        }
    }

    /// On-disk location of a local-path dependency. Relative paths resolve
    /// against the workspace, as the loader resolves them.
    #[must_use]
    pub fn local_dir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.options.workspace_path().join(path)
        }
    }

    // --- Lookups ---

    /// Entry recorded for `name` under `parent`.
    ///
    /// Locks written before parents were keyed by dependency path stored a
    /// dependency's children under its bare name; that key is tried when
    /// `parent` is a dependency path.
    #[must_use]
    pub fn get_mod(&self, name: &str, parent: &str) -> Option<&ResolvedVersionConstraint> {
        self.install_cache.get(parent, name).or_else(|| {
            let (bare, _) = parent.rsplit_once('@')?;
            self.install_cache.get(bare, name)
        })
    }

    /// Entry for `name` under any parent.
    #[must_use]
    pub fn find_mod(&self, name: &str) -> Option<&ResolvedVersionConstraint> {
        self.install_cache.find(name).map(|(_, resolved)| resolved)
    }

    /// Installed entry for the constraint's dependency if it satisfies the
    /// constraint; `None` when absent or unsatisfied.
    #[must_use]
    pub fn get_locked_mod_version(
        &self,
        constraint: &ModVersionConstraint,
        parent: &str,
    ) -> Option<&ResolvedVersionConstraint> {
        self.get_mod(constraint.name(), parent)
            .filter(|resolved| resolved.satisfies(constraint))
    }

    /// Like [`Self::get_locked_mod_version`] but a locked entry that fails
    /// the constraint is an error.
    ///
    /// # Errors
    ///
    /// Returns `DependencyError::ConstraintViolation` naming the locked
    /// version and the constraint.
    pub fn ensure_locked_mod_version(
        &self,
        constraint: &ModVersionConstraint,
        parent: &str,
    ) -> ModResult<Option<&ResolvedVersionConstraint>> {
        match self.get_mod(constraint.name(), parent) {
            Some(resolved) if resolved.satisfies(constraint) => Ok(Some(resolved)),
            Some(resolved) => Err(DependencyError::ConstraintViolation {
                dependency_path: resolved.dependency_path(),
                locked: resolved.version.detailed(),
                constraint: constraint.raw().to_string(),
                parent: parent.to_string(),
            }
            .into()),
            None => Ok(None),
        }
    }

    /// Whether `name` at `version` was found on disk.
    #[must_use]
    pub fn contains_mod(&self, name: &str, version: &DependencyVersion) -> bool {
        match (version, version.install_dir_suffix()) {
            (DependencyVersion::LocalPath(path), _) => self.installed_local.contains(path),
            (_, Some(suffix)) => self
                .installed
                .get(name)
                .is_some_and(|suffixes| suffixes.contains(&suffix)),
            (_, None) => false,
        }
    }

    /// Folder suffixes installed for `name`.
    #[must_use]
    pub fn installed_versions(&self, name: &str) -> Vec<&str> {
        self.installed
            .get(name)
            .map(|suffixes| suffixes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    // --- Status ---

    #[must_use]
    pub const fn lock_file_exists(&self) -> bool {
        self.lock_file_exists
    }

    /// `true` when nothing is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.install_cache.is_empty() && self.missing_versions.is_empty()
    }

    /// `true` when some locked dependency is not installed.
    #[must_use]
    pub fn incomplete(&self) -> bool {
        !self.missing_versions.is_empty()
    }

    /// `true` when any entry was written with an older schema.
    #[must_use]
    pub fn requires_full_reinstall(&self) -> bool {
        self.install_cache
            .entries()
            .chain(self.missing_versions.entries())
            .any(|(_, resolved)| !resolved.is_current_schema())
    }

    // --- Accessors ---

    #[must_use]
    pub const fn options(&self) -> &WorkspaceLockOptions {
        &self.options
    }

    #[must_use]
    pub fn workspace_path(&self) -> &Path {
        self.options.workspace_path()
    }

    #[must_use]
    pub fn install_path(&self) -> PathBuf {
        self.options.install_path()
    }

    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        self.options.lock_file_path()
    }

    #[must_use]
    pub const fn install_cache(&self) -> &DependencyVersionMap {
        &self.install_cache
    }

    #[must_use]
    pub const fn missing_versions(&self) -> &DependencyVersionMap {
        &self.missing_versions
    }

    /// Replaces the install cache, e.g. after an install run.
    pub fn set_install_cache(&mut self, install_cache: DependencyVersionMap) {
        self.install_cache = install_cache;
    }

    /// Dependency tree of the install cache rooted at `root`.
    #[must_use]
    pub fn dependency_tree(&self, root: &str) -> DependencyTree {
        self.install_cache.dependency_tree(root)
    }

    // --- Persistence ---

    /// Writes the install cache to the lock file.
    ///
    /// The file is replaced atomically. An empty cache removes the file.
    ///
    /// # Errors
    ///
    /// Returns `LockError::WriteFailed` if the file cannot be written.
    pub fn save(&mut self) -> ModResult<()> {
        let path = self.lock_file_path();
        let write_failed = |message: String| LockError::WriteFailed {
            path: path.display().to_string(),
            message,
        };

        if self.install_cache.is_empty() {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed empty lock file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(write_failed(e.to_string()).into()),
            }
            self.lock_file_exists = false;
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.install_cache)
            .map_err(|e| write_failed(e.to_string()))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
        temp.write_all(json.as_bytes())
            .and_then(|()| temp.write_all(b"\n"))
            .map_err(|e| write_failed(e.to_string()))?;
        temp.persist(&path)
            .map_err(|e| write_failed(e.error.to_string()))?;

        debug!(path = %path.display(), entries = self.install_cache.len(), "Saved lock file");
        self.lock_file_exists = true;
        Ok(())
    }
}

/// Reads a persisted install cache; `None` when the file does not exist.
///
/// # Errors
///
/// Returns `LockError::ReadFailed` or `LockError::Malformed`.
pub fn read_lock_file(path: &Path) -> ModResult<Option<DependencyVersionMap>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No lock file");
            return Ok(None);
        }
        Err(e) => {
            return Err(LockError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            }
            .into());
        }
    };

    let cache: DependencyVersionMap = serde_json::from_str(&content).map_err(|e| {
        ModError::from(LockError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })?;
    Ok(Some(cache))
}
