// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tree::DependencyTree;
use super::{DependencyVersion, ResolvedVersionConstraint, VersionChange};

/// Dependency name -> resolved entry, for one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedVersionMap(BTreeMap<String, ResolvedVersionConstraint>);

impl ResolvedVersionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry keyed by its name, returning the one it replaced.
    pub fn insert(
        &mut self,
        resolved: ResolvedVersionConstraint,
    ) -> Option<ResolvedVersionConstraint> {
        self.0.insert(resolved.name.clone(), resolved)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedVersionConstraint> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ResolvedVersionConstraint> {
        self.0.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedVersionConstraint)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &ResolvedVersionConstraint> {
        self.0.values()
    }
}

impl FromIterator<ResolvedVersionConstraint> for ResolvedVersionMap {
    fn from_iter<I: IntoIterator<Item = ResolvedVersionConstraint>>(iter: I) -> Self {
        let mut map = Self::new();
        for resolved in iter {
            map.insert(resolved);
        }
        map
    }
}

/// Dependency name -> every distinct version resolved for it across parents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVersionListMap(BTreeMap<String, Vec<ResolvedVersionConstraint>>);

impl ResolvedVersionListMap {
    /// Adds an entry unless the same version is already listed for the name.
    pub fn add(&mut self, resolved: ResolvedVersionConstraint) {
        let versions = self.0.entry(resolved.name.clone()).or_default();
        if !versions.iter().any(|v| v.version == resolved.version) {
            versions.push(resolved);
        }
    }

    /// Versions recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> &[ResolvedVersionConstraint] {
        self.0.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether `name` is recorded at `version`.
    #[must_use]
    pub fn contains(&self, name: &str, version: &DependencyVersion) -> bool {
        self.get(name).iter().any(|r| &r.version == version)
    }

    /// Dependency names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parent install-cache key -> dependency name -> resolved entry.
///
/// This is the persisted shape of the lock file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyVersionMap(BTreeMap<String, ResolvedVersionMap>);

impl DependencyVersionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `resolved` as a dependency of `parent`.
    pub fn add(&mut self, parent: impl Into<String>, resolved: ResolvedVersionConstraint) {
        self.0.entry(parent.into()).or_default().insert(resolved);
    }

    /// Direct lookup.
    #[must_use]
    pub fn get(&self, parent: &str, name: &str) -> Option<&ResolvedVersionConstraint> {
        self.0.get(parent).and_then(|deps| deps.get(name))
    }

    /// All dependencies recorded for `parent`.
    #[must_use]
    pub fn dependencies_of(&self, parent: &str) -> Option<&ResolvedVersionMap> {
        self.0.get(parent)
    }

    /// Removes one entry; drops the parent once it has no entries left.
    pub fn remove(&mut self, parent: &str, name: &str) -> Option<ResolvedVersionConstraint> {
        let deps = self.0.get_mut(parent)?;
        let removed = deps.remove(name);
        if deps.is_empty() {
            self.0.remove(parent);
        }
        removed
    }

    /// First entry for `name` under any parent, in parent order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(&str, &ResolvedVersionConstraint)> {
        self.0
            .iter()
            .find_map(|(parent, deps)| deps.get(name).map(|r| (parent.as_str(), r)))
    }

    /// Every `(parent, entry)` pair, ordered by parent then name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ResolvedVersionConstraint)> {
        self.0
            .iter()
            .flat_map(|(parent, deps)| deps.values().map(move |r| (parent.as_str(), r)))
    }

    /// Parent keys in order.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries across all parents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(ResolvedVersionMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(ResolvedVersionMap::is_empty)
    }

    /// Collapses parents: name -> distinct resolved versions.
    #[must_use]
    pub fn flatten(&self) -> ResolvedVersionListMap {
        let mut flat = ResolvedVersionListMap::default();
        for (_, resolved) in self.entries() {
            flat.add(resolved.clone());
        }
        flat
    }

    /// Entries of `self` whose `(parent, name)` does not exist in `other`.
    #[must_use]
    pub fn missing_from(&self, other: &Self) -> Self {
        self.filter_entries(|parent, resolved| other.get(parent, &resolved.name).is_none())
    }

    /// Entries of `other` whose version is higher than in `self`.
    #[must_use]
    pub fn upgraded_in(&self, other: &Self) -> Self {
        self.changed_in(other, VersionChange::Upgraded)
    }

    /// Entries of `other` whose version is lower than in `self`.
    #[must_use]
    pub fn downgraded_in(&self, other: &Self) -> Self {
        self.changed_in(other, VersionChange::Downgraded)
    }

    fn changed_in(&self, other: &Self, change: VersionChange) -> Self {
        let mut changed = Self::new();
        for (parent, before) in self.entries() {
            if let Some(after) = other.get(parent, &before.name)
                && before.version.change_to(&after.version) == change
            {
                changed.add(parent, after.clone());
            }
        }
        changed
    }

    fn filter_entries<F>(&self, keep: F) -> Self
    where
        F: Fn(&str, &ResolvedVersionConstraint) -> bool,
    {
        let mut filtered = Self::new();
        for (parent, resolved) in self.entries() {
            if keep(parent, resolved) {
                filtered.add(parent, resolved.clone());
            }
        }
        filtered
    }

    /// Expands the map into a tree rooted at `root`.
    ///
    /// Children of a dependency are looked up under its dependency path
    /// (`name@version`). Locks written before parents were keyed that way
    /// stored them under the bare name, so that key is tried next. A
    /// dependency already on the current branch is shown but not expanded.
    #[must_use]
    pub fn dependency_tree(&self, root: &str) -> DependencyTree {
        let mut path = vec![root.to_string()];
        DependencyTree::with_children(root, self.subtree(root, None, &mut path))
    }

    fn subtree(
        &self,
        key: &str,
        legacy_key: Option<&str>,
        path: &mut Vec<String>,
    ) -> Vec<DependencyTree> {
        let Some(deps) = self
            .0
            .get(key)
            .or_else(|| legacy_key.and_then(|k| self.0.get(k)))
        else {
            return Vec::new();
        };

        deps.values()
            .map(|resolved| {
                let child_key = resolved.dependency_path();
                let label = match resolved.commit() {
                    Some(_) => format!("{}@{}", resolved.name, resolved.version.detailed()),
                    None => child_key.clone(),
                };
                if path.contains(&child_key) {
                    return DependencyTree::leaf(label);
                }
                path.push(child_key.clone());
                let children = self.subtree(&child_key, Some(&resolved.name), path);
                path.pop();
                DependencyTree::with_children(label, children)
            })
            .collect()
    }
}
