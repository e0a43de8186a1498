// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mod data model.
//!
//! ```text
//! Mod
//!   name, title, path
//!   dependency_path / version  (set when loaded as a dependency)
//!   requires: [Require]        name + one of version | branch | path
//!   resources: ResourceMap     own + every transitive dependency's
//!   dependencies: name -> Mod  loaded children, sorted by name
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{DependencyError, ModResult};
use crate::versions::{DependencyVersion, ModVersionConstraint};

/// A required dependency as declared in a mod definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Require {
    /// Dependency name, e.g. `github.com/acme/lib`.
    pub name: String,
    /// Short name; defaults to the last segment of `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Local directory. The loader uses the path recorded in the lock, and a
    /// relative one resolves against the workspace root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Require {
    /// Creates a semver requirement.
    #[must_use]
    pub fn version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Creates a branch requirement.
    #[must_use]
    pub fn branch(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: Some(branch.into()),
            ..Self::default()
        }
    }

    /// Creates a local-path requirement.
    #[must_use]
    pub fn path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Short name the declaring mod refers to the dependency by.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.name.rsplit('/').next().unwrap_or(&self.name))
    }

    /// Parses the declared constraint.
    ///
    /// # Errors
    ///
    /// Returns `DependencyError::InvalidRequire` unless exactly one of
    /// `version`, `branch` or `path` is set, and
    /// `DependencyError::InvalidConstraint` for an unparsable range.
    pub fn constraint(&self, parent: &str) -> ModResult<ModVersionConstraint> {
        let invalid = |message: &str| DependencyError::InvalidRequire {
            name: self.name.clone(),
            parent: parent.to_string(),
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty").into());
        }

        match (&self.version, &self.branch, &self.path) {
            (Some(version), None, None) => ModVersionConstraint::semver(&self.name, version),
            (None, Some(branch), None) => {
                if branch.trim().is_empty() {
                    return Err(invalid("branch is empty").into());
                }
                Ok(ModVersionConstraint::branch(&self.name, branch))
            }
            (None, None, Some(path)) => Ok(ModVersionConstraint::local_path(&self.name, path)),
            (None, None, None) => {
                Err(invalid("one of 'version', 'branch' or 'path' is required").into())
            }
            _ => Err(invalid("only one of 'version', 'branch' or 'path' may be set").into()),
        }
    }
}

/// A named resource declared by a mod.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Name of the declaring mod.
    pub mod_name: String,
    /// Resource type, the top-level table it was declared in.
    pub kind: String,
    pub name: String,
    /// File the resource was declared in.
    pub file: PathBuf,
    pub attributes: toml::Table,
}

impl Resource {
    /// `<mod>.<type>.<name>`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.mod_name, self.kind, self.name)
    }
}

/// Resources keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMap(BTreeMap<String, Resource>);

impl ResourceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource.
    ///
    /// Re-adding an identical resource is a no-op, which happens when two
    /// dependencies share a transitive dependency. A different resource with
    /// the same qualified name is reported as a collision.
    pub fn insert(&mut self, resource: Resource) -> Option<Diagnostic> {
        let key = resource.qualified_name();
        match self.0.get(&key) {
            Some(existing) if *existing == resource => None,
            Some(existing) => Some(
                Diagnostic::error(format!(
                    "duplicate resource '{key}', first declared in '{}'",
                    existing.file.display()
                ))
                .in_file(&resource.file),
            ),
            None => {
                self.0.insert(key, resource);
                None
            }
        }
    }

    /// Merges `other` into `self`, returning collision diagnostics.
    pub fn merge(&mut self, other: &Self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for resource in other.0.values() {
            if let Some(d) = self.insert(resource.clone()) {
                diagnostics.push(d);
            }
        }
        diagnostics
    }

    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&Resource> {
        self.0.get(qualified_name)
    }

    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.0.contains_key(qualified_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Qualified names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Resource> {
        self.0.values()
    }

    /// Names of the mods that contributed resources.
    #[must_use]
    pub fn mod_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.values().map(|r| r.mod_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// A parsed mod, optionally with its loaded dependencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mod {
    pub name: String,
    pub title: Option<String>,
    /// Directory the mod was loaded from.
    pub path: PathBuf,
    /// `<name>@<version>` when loaded as a dependency; `None` for the root.
    pub dependency_path: Option<String>,
    /// Locked version when loaded as a dependency.
    pub version: Option<DependencyVersion>,
    pub requires: Vec<Require>,
    /// Own resources plus those of every transitive dependency.
    pub resources: ResourceMap,
    /// Loaded direct dependencies keyed by dependency name.
    pub dependencies: BTreeMap<String, Mod>,
}

impl Mod {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// A mod for a directory without a definition file, named after the
    /// directory.
    #[must_use]
    pub fn default_for(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map_or_else(|| "mod".to_string(), |n| n.to_string_lossy().into_owned());
        Self::new(name, dir)
    }

    /// Key this mod's own dependencies are recorded under in the lock.
    #[must_use]
    pub fn install_cache_key(&self) -> &str {
        self.dependency_path.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn has_requires(&self) -> bool {
        !self.requires.is_empty()
    }

    /// Number of mods in this tree, including `self`.
    #[must_use]
    pub fn mod_count(&self) -> usize {
        1 + self.dependencies.values().map(Self::mod_count).sum::<usize>()
    }
}

impl fmt::Display for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.install_cache_key())
    }
}
