// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;

/// The concrete identity a dependency resolved to.
///
/// Exactly one variant is ever active: a tagged release, a branch head at a
/// specific commit, or a directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyVersion {
    /// Tagged release, ordered by semver precedence.
    Semver(Version),
    /// Branch head. Satisfaction looks at the branch, change detection at the commit.
    Branch { branch: String, commit: String },
    /// Local directory. Has no ordering; equality is path equality.
    LocalPath(PathBuf),
}

/// How a version moved between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
    Unchanged,
    Upgraded,
    Downgraded,
}

impl DependencyVersion {
    /// Parses a tag such as `v1.2.3` or `1.2.3`.
    #[must_use]
    pub fn parse_semver(tag: &str) -> Option<Self> {
        parse_tag(tag).map(Self::Semver)
    }

    /// Returns the semantic version, if this is a tagged release.
    #[must_use]
    pub const fn as_semver(&self) -> Option<&Version> {
        match self {
            Self::Semver(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the branch name, if this is a branch head.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Branch { branch, .. } => Some(branch),
            _ => None,
        }
    }

    /// Returns the resolved commit, if this is a branch head.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        match self {
            Self::Branch { commit, .. } => Some(commit),
            _ => None,
        }
    }

    /// Returns the directory, if this is a local-path dependency.
    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::LocalPath(p) => Some(p),
            _ => None,
        }
    }

    /// Returns `true` for local-path dependencies.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::LocalPath(_))
    }

    /// Suffix of the install folder `<name>@<suffix>`.
    ///
    /// Local-path dependencies are not installed and have no suffix.
    #[must_use]
    pub fn install_dir_suffix(&self) -> Option<String> {
        match self {
            Self::Semver(v) => Some(format!("v{v}")),
            Self::Branch { branch, .. } => Some(branch.replace(['/', '\\'], "-")),
            Self::LocalPath(_) => None,
        }
    }

    /// Compares `self` (before) with `other` (after).
    ///
    /// Semver uses precedence, branches report any commit or branch change
    /// as an upgrade, local paths never change. A switch between variants
    /// counts as an upgrade.
    #[must_use]
    pub fn change_to(&self, other: &Self) -> VersionChange {
        match (self, other) {
            (Self::Semver(before), Self::Semver(after)) => match after.cmp_precedence(before) {
                Ordering::Greater => VersionChange::Upgraded,
                Ordering::Less => VersionChange::Downgraded,
                Ordering::Equal => VersionChange::Unchanged,
            },
            (
                Self::Branch {
                    branch: b1,
                    commit: c1,
                },
                Self::Branch {
                    branch: b2,
                    commit: c2,
                },
            ) => {
                if b1 == b2 && c1 == c2 {
                    VersionChange::Unchanged
                } else {
                    VersionChange::Upgraded
                }
            }
            (Self::LocalPath(_), Self::LocalPath(_)) => VersionChange::Unchanged,
            _ => VersionChange::Upgraded,
        }
    }

    /// Display form including the commit for branch heads.
    #[must_use]
    pub fn detailed(&self) -> String {
        match self {
            Self::Branch { branch, commit } if !commit.is_empty() => {
                format!("{branch}#{}", short_commit(commit))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semver(v) => write!(f, "v{v}"),
            Self::Branch { branch, .. } => f.write_str(branch),
            Self::LocalPath(p) => write!(f, "file:{}", p.display()),
        }
    }
}

/// Parses a semver tag, tolerating a leading `v`.
#[must_use]
pub fn parse_tag(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(bare).ok()
}

fn short_commit(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
