// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::version::parse_tag;
use super::{DependencyVersion, ModVersionConstraint};
use crate::error::LockError;

/// Schema version stamped on every lock entry.
///
/// Bumped whenever the entry layout changes. A lock holding any other value
/// has to be reinstalled from scratch.
pub const STRUCT_VERSION: u32 = 20_240_601;

/// A resolved dependency together with how it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LockEntry", into = "LockEntry")]
pub struct ResolvedVersionConstraint {
    /// Dependency name, e.g. `github.com/acme/lib`.
    pub name: String,
    /// Short name the parent refers to the dependency by.
    pub alias: String,
    /// The installed version.
    pub version: DependencyVersion,
    /// Constraint text as written in the parent's require block.
    pub constraint: String,
    /// Git ref the installer checked out (`refs/tags/v1.0.0`, `refs/heads/main`).
    pub git_ref: String,
    /// Entry schema version, see [`STRUCT_VERSION`].
    pub struct_version: u32,
}

impl ResolvedVersionConstraint {
    /// Creates an entry stamped with the current schema version.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        alias: impl Into<String>,
        version: DependencyVersion,
        constraint: impl Into<String>,
    ) -> Self {
        let git_ref = match &version {
            DependencyVersion::Semver(v) => format!("refs/tags/v{v}"),
            DependencyVersion::Branch { branch, .. } => format!("refs/heads/{branch}"),
            DependencyVersion::LocalPath(_) => String::new(),
        };
        Self {
            name: name.into(),
            alias: alias.into(),
            version,
            constraint: constraint.into(),
            git_ref,
            struct_version: STRUCT_VERSION,
        }
    }

    /// Resolved commit; set exactly when the version is a branch head.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        self.version.commit()
    }

    /// `<name>@<version>`; also the install-cache key of the dependency
    /// when it is itself a parent.
    #[must_use]
    pub fn dependency_path(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Where this dependency lives on disk.
    #[must_use]
    pub fn install_dir(&self, install_root: &Path) -> PathBuf {
        match self.version.install_dir_suffix() {
            Some(suffix) => install_root.join(format!("{}@{suffix}", self.name)),
            None => self
                .version
                .local_path()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Whether the locked version satisfies `constraint`.
    #[must_use]
    pub fn satisfies(&self, constraint: &ModVersionConstraint) -> bool {
        constraint.satisfied_by(&self.version)
    }

    /// Whether this entry was written with the current schema.
    #[must_use]
    pub const fn is_current_schema(&self) -> bool {
        self.struct_version == STRUCT_VERSION
    }
}

/// On-disk shape of a lock entry.
///
/// The version is spread over optional fields; conversion enforces that
/// exactly one of `version`, `branch`+`commit` or `file_path` is present.
#[derive(Debug, Serialize, Deserialize)]
struct LockEntry {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
    #[serde(default)]
    constraint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    git_ref: String,
    // Entries written before the field existed read as 0 and need a reinstall
    #[serde(default)]
    struct_version: u32,
}

impl TryFrom<LockEntry> for ResolvedVersionConstraint {
    type Error = LockError;

    fn try_from(entry: LockEntry) -> Result<Self, Self::Error> {
        let invalid = |message: String| LockError::InvalidEntry {
            name: entry.name.clone(),
            message,
        };

        let version = match (&entry.version, &entry.branch, &entry.file_path) {
            (Some(tag), None, None) => DependencyVersion::Semver(
                parse_tag(tag).ok_or_else(|| invalid(format!("invalid version '{tag}'")))?,
            ),
            (None, Some(branch), None) => DependencyVersion::Branch {
                branch: branch.clone(),
                commit: entry
                    .commit
                    .clone()
                    .ok_or_else(|| invalid(format!("branch '{branch}' has no commit")))?,
            },
            (None, None, Some(path)) => DependencyVersion::LocalPath(path.clone()),
            (None, None, None) => {
                return Err(invalid(
                    "one of version, branch or file_path is required".to_string(),
                ));
            }
            _ => {
                return Err(invalid(
                    "only one of version, branch or file_path may be set".to_string(),
                ));
            }
        };

        if entry.commit.is_some() && !matches!(version, DependencyVersion::Branch { .. }) {
            return Err(invalid("commit is only valid with a branch".to_string()));
        }

        Ok(Self {
            name: entry.name,
            alias: entry.alias,
            version,
            constraint: entry.constraint,
            git_ref: entry.git_ref,
            struct_version: entry.struct_version,
        })
    }
}

impl From<ResolvedVersionConstraint> for LockEntry {
    fn from(resolved: ResolvedVersionConstraint) -> Self {
        let (version, branch, commit, file_path) = match resolved.version {
            DependencyVersion::Semver(v) => (Some(v.to_string()), None, None, None),
            DependencyVersion::Branch { branch, commit } => {
                (None, Some(branch), Some(commit), None)
            }
            DependencyVersion::LocalPath(p) => (None, None, None, Some(p)),
        };
        Self {
            name: resolved.name,
            alias: resolved.alias,
            version,
            branch,
            commit,
            file_path,
            constraint: resolved.constraint,
            git_ref: resolved.git_ref,
            struct_version: resolved.struct_version,
        }
    }
}
