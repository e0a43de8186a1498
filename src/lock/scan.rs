// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Install directory scan.
//!
//! ```text
//! <install-root>/github.com/acme/lib@v1.2.0/mod.toml
//!                '-------- name -------' '-suffix-'
//!
//! lib@v1.2  --rename-->  lib@v1.2.0     (legacy, patch-less, lock has 1.2.0)
//! lib@v1    --rename-->  lib@v1.0.0     (lock has 1.0.0, no branch 'v1')
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::ModResult;
use crate::utility::fs::walk::{ListOptions, list_files};
use crate::versions::{DependencyVersion, DependencyVersionMap};

/// Folder suffixes found on disk, per dependency name.
pub type InstalledVersions = BTreeMap<String, BTreeSet<String>>;

/// Folder suffixes the lock expects, per dependency name.
#[derive(Debug, Default)]
struct LockedSuffixes {
    semver: BTreeMap<String, BTreeSet<String>>,
    any: BTreeMap<String, BTreeSet<String>>,
}

impl LockedSuffixes {
    fn from_cache(cache: &DependencyVersionMap) -> Self {
        let mut locked = Self::default();
        for (_, resolved) in cache.entries() {
            let Some(suffix) = resolved.version.install_dir_suffix() else {
                continue;
            };
            if matches!(resolved.version, DependencyVersion::Semver(_)) {
                locked
                    .semver
                    .entry(resolved.name.clone())
                    .or_default()
                    .insert(suffix.clone());
            }
            locked
                .any
                .entry(resolved.name.clone())
                .or_default()
                .insert(suffix);
        }
        locked
    }

    /// A legacy folder is renamed only when a locked release expects the
    /// canonical name and no locked entry uses the folder as it is.
    fn wants_rename(&self, name: &str, legacy: &str, canonical: &str) -> bool {
        let has = |map: &BTreeMap<String, BTreeSet<String>>, suffix: &str| {
            map.get(name).is_some_and(|suffixes| suffixes.contains(suffix))
        };
        has(&self.semver, canonical) && !has(&self.any, legacy)
    }
}

/// Scans `install_path` for mod definitions named `mod_file_name`.
///
/// Every definition whose directory is named `<name>@<suffix>` records
/// `suffix` under `name`, where `name` is the directory path relative to the
/// install root. With `fix_legacy` set, a patch-less semver folder is renamed
/// to its canonical form first when `cache` locks that release and no locked
/// branch lives in the folder as named; a folder that cannot be renamed is
/// skipped.
///
/// A missing install directory yields an empty set.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be walked.
pub fn scan_install_dir(
    install_path: &Path,
    mod_file_name: &str,
    fix_legacy: bool,
    cache: &DependencyVersionMap,
) -> ModResult<InstalledVersions> {
    let mut installed = InstalledVersions::new();
    if !install_path.is_dir() {
        debug!(path = %install_path.display(), "Install directory does not exist");
        return Ok(installed);
    }

    let locked = LockedSuffixes::from_cache(cache);
    let files = list_files(install_path, &ListOptions::for_install_scan(mod_file_name))?;
    for file in files {
        let Some(mod_dir) = file.parent() else {
            continue;
        };
        let Some((name, suffix)) = split_install_dir(install_path, mod_dir) else {
            continue;
        };

        let suffix = match canonical_suffix(&suffix) {
            Some(canonical) if fix_legacy && locked.wants_rename(&name, &suffix, &canonical) => {
                match rename_legacy_folder(mod_dir, &name, &suffix, &canonical) {
                    Some(()) => canonical,
                    None => continue,
                }
            }
            _ => suffix,
        };

        debug!(name = %name, version = %suffix, "Found installed mod");
        installed.entry(name).or_default().insert(suffix);
    }

    Ok(installed)
}

/// Splits an install folder into `(name, suffix)` at the last `@` of its
/// final component.
fn split_install_dir(install_path: &Path, mod_dir: &Path) -> Option<(String, String)> {
    let dir_name = mod_dir.file_name()?.to_str()?;
    let (_, suffix) = dir_name.rsplit_once('@')?;
    let relative = mod_dir.strip_prefix(install_path).ok()?;
    let relative = relative.to_str()?.replace('\\', "/");
    let (name, _) = relative.rsplit_once('@')?;
    if name.is_empty() || suffix.is_empty() {
        return None;
    }
    Some((name.to_string(), suffix.to_string()))
}

fn legacy_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^v([0-9]+)(?:\.([0-9]+))?$").ok())
        .as_ref()
}

/// Canonical `vX.Y.0` form of a legacy `vX.Y` / `vX` suffix, or `None` if
/// the suffix is not legacy.
#[must_use]
pub fn canonical_suffix(suffix: &str) -> Option<String> {
    let captures = legacy_pattern()?.captures(suffix)?;
    let major = captures.get(1)?.as_str();
    let minor = captures.get(2).map_or("0", |m| m.as_str());
    Some(format!("v{major}.{minor}.0"))
}

fn rename_legacy_folder(mod_dir: &Path, name: &str, legacy: &str, canonical: &str) -> Option<()> {
    let target: PathBuf = mod_dir.with_file_name(format!(
        "{}@{canonical}",
        name.rsplit('/').next().unwrap_or(name)
    ));

    if target.exists() {
        warn!(
            from = %mod_dir.display(),
            to = %target.display(),
            "Skipping legacy mod folder, canonical folder already exists"
        );
        return None;
    }

    match fs::rename(mod_dir, &target) {
        Ok(()) => {
            info!(name = %name, from = %legacy, to = %canonical, "Renamed legacy mod folder");
            Some(())
        }
        Err(e) => {
            warn!(
                path = %mod_dir.display(),
                error = %e,
                "Failed to rename legacy mod folder, skipping"
            );
            None
        }
    }
}
