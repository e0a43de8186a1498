// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolved versions and the collections built over them.
//!
//! ```text
//! DependencyVersion          Semver(v) | Branch{branch, commit} | LocalPath(p)
//!        |
//!        v
//! ResolvedVersionConstraint  + name, alias, constraint text, git ref, schema
//!        |
//!        v
//! ResolvedVersionMap         name -> entry               (one parent)
//! DependencyVersionMap       parent -> name -> entry     (the lock)
//!   flatten()                name -> [entries]           (ResolvedVersionListMap)
//!   missing_from / upgraded_in / downgraded_in           (InstallDiff)
//!   dependency_tree(root)                                (DependencyTree)
//!
//! ModVersionConstraint       semver range | branch | local path
//!   satisfied_by(&DependencyVersion)
//! ```

pub mod collections;
pub mod constraint;
pub mod diff;
pub mod resolved;
pub mod tree;
pub mod version;


pub use collections::{DependencyVersionMap, ResolvedVersionListMap, ResolvedVersionMap};
pub use constraint::{ConstraintKind, ModVersionConstraint};
pub use diff::InstallDiff;
pub use resolved::{ResolvedVersionConstraint, STRUCT_VERSION};
pub use tree::DependencyTree;
pub use version::{DependencyVersion, VersionChange};
