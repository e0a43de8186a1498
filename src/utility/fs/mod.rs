// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities with parallel traversal.
//!
//! ```text
//! walk:  list_files()   ignore::WalkParallel (multi-core)
//!                       include/exclude globs (wax)
//!        ListOptions    include, exclude, hidden, gitignore, skip dirs
//! ```

pub mod walk;
