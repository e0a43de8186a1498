// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::path::PathBuf;

use semver::{Op, VersionReq};

use super::DependencyVersion;
use crate::error::{DependencyError, ModResult};

/// What a require declaration accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Semver range (`^1.2.0`, `>=1.0, <2.0`, `*`).
    Semver(VersionReq),
    /// Branch name, matched textually.
    Branch(String),
    /// Local directory; any locked local path satisfies it.
    LocalPath(PathBuf),
}

/// A dependency name plus the constraint its parent declared.
///
/// The raw expression is kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModVersionConstraint {
    name: String,
    raw: String,
    kind: ConstraintKind,
}

impl ModVersionConstraint {
    /// Creates a semver range constraint.
    ///
    /// `*`, `latest` and the empty string accept any release. A `v` in front
    /// of a version number is tolerated (`^v1.2` == `^1.2`). A caret on a
    /// full `X.Y.Z` stays within `X.Y` (`^1.2.0` == `>=1.2.0, <1.3.0`).
    ///
    /// # Errors
    ///
    /// Returns `DependencyError::InvalidConstraint` if the range does not parse.
    pub fn semver(name: impl Into<String>, expression: &str) -> ModResult<Self> {
        let name = name.into();
        let trimmed = expression.trim();
        let req = if trimmed.is_empty() || trimmed == "*" || trimmed == "latest" {
            VersionReq::STAR
        } else {
            let mut req = VersionReq::parse(&strip_v_prefixes(trimmed)).map_err(|e| {
                DependencyError::InvalidConstraint {
                    name: name.clone(),
                    constraint: expression.to_string(),
                    message: e.to_string(),
                }
            })?;
            pin_caret_minor(&mut req);
            req
        };

        Ok(Self {
            name,
            raw: expression.to_string(),
            kind: ConstraintKind::Semver(req),
        })
    }

    /// Creates a branch constraint.
    #[must_use]
    pub fn branch(name: impl Into<String>, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        Self {
            name: name.into(),
            raw: branch.clone(),
            kind: ConstraintKind::Branch(branch),
        }
    }

    /// Creates a local-path constraint.
    #[must_use]
    pub fn local_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            raw: format!("file:{}", path.display()),
            kind: ConstraintKind::LocalPath(path),
        }
    }

    /// Dependency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expression as the user wrote it.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed constraint.
    #[must_use]
    pub const fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Returns `true` for local-path constraints.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.kind, ConstraintKind::LocalPath(_))
    }

    /// Whether `version` satisfies this constraint.
    ///
    /// Semver ranges match tagged releases, branch constraints match a locked
    /// branch of the same name whatever its commit, and local-path
    /// constraints accept any locked local path.
    #[must_use]
    pub fn satisfied_by(&self, version: &DependencyVersion) -> bool {
        match (&self.kind, version) {
            (ConstraintKind::Semver(req), DependencyVersion::Semver(v)) => req.matches(v),
            (ConstraintKind::Branch(wanted), DependencyVersion::Branch { branch, .. }) => {
                wanted == branch
            }
            (ConstraintKind::LocalPath(_), DependencyVersion::LocalPath(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ModVersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.raw)
    }
}

/// Turns `^X.Y.Z` (and a bare `X.Y.Z`, which parses as a caret) into
/// `~X.Y.Z`. Carets with fewer components keep their meaning.
fn pin_caret_minor(req: &mut VersionReq) {
    for comparator in &mut req.comparators {
        let full = comparator.minor.is_some() && comparator.patch.is_some();
        if comparator.op == Op::Caret && full {
            comparator.op = Op::Tilde;
        }
    }
}

/// Drops a `v`/`V` that directly precedes a version number.
fn strip_v_prefixes(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut prev: Option<char> = None;
    let mut chars = expression.chars().peekable();

    while let Some(ch) = chars.next() {
        let at_boundary = prev.is_none_or(|p| !p.is_ascii_alphanumeric() && p != '.');
        let next_is_digit = chars.peek().is_some_and(char::is_ascii_digit);
        if (ch == 'v' || ch == 'V') && at_boundary && next_is_digit {
            prev = Some(ch);
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }

    out
}
