// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

use super::DependencyVersionMap;

/// The effect of an install or update run on the lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallDiff {
    /// Entries only present after.
    pub added: DependencyVersionMap,
    /// Entries only present before.
    pub removed: DependencyVersionMap,
    /// Entries whose version went up (values are the new entries).
    pub upgraded: DependencyVersionMap,
    /// Entries whose version went down (values are the new entries).
    pub downgraded: DependencyVersionMap,
    before: DependencyVersionMap,
}

impl InstallDiff {
    /// Compares two install-cache snapshots.
    #[must_use]
    pub fn between(before: &DependencyVersionMap, after: &DependencyVersionMap) -> Self {
        Self {
            added: after.missing_from(before),
            removed: before.missing_from(after),
            upgraded: before.upgraded_in(after),
            downgraded: before.downgraded_in(after),
            before: before.clone(),
        }
    }

    /// `true` when the snapshots resolve to the same versions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.upgraded.is_empty()
            && self.downgraded.is_empty()
    }

    fn write_changes(
        &self,
        f: &mut fmt::Formatter<'_>,
        marker: char,
        changed: &DependencyVersionMap,
    ) -> fmt::Result {
        for (parent, after) in changed.entries() {
            let before = self
                .before
                .get(parent, &after.name)
                .map_or_else(String::new, |b| b.version.detailed());
            writeln!(
                f,
                "{marker} {} {before} -> {} (in {parent})",
                after.name,
                after.version.detailed()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for InstallDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no dependency changes");
        }
        for (parent, resolved) in self.added.entries() {
            writeln!(f, "+ {} (in {parent})", resolved.dependency_path())?;
        }
        for (parent, resolved) in self.removed.entries() {
            writeln!(f, "- {} (in {parent})", resolved.dependency_path())?;
        }
        self.write_changes(f, '^', &self.upgraded)?;
        self.write_changes(f, 'v', &self.downgraded)
    }
}
