// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tree command implementation for modlock.

use tracing::debug;

use crate::cli::lock::TreeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::lock::WorkspaceLock;
use crate::modconfig::{ModParser, TomlModParser};
use crate::versions::DependencyVersionMap;

/// Main handler for tree command.
///
/// # Errors
///
/// Returns an error if the lock cannot be loaded or the workspace mod
/// definition cannot be read.
pub fn run_tree_command(args: &TreeArgs, config: &Config) -> Result<()> {
    let lock = WorkspaceLock::load(config.lock_options())?;
    if !lock.lock_file_exists() {
        println!("No lock file at {}", lock.lock_file_path().display());
        return Ok(());
    }

    let output = render_tree(&lock, args)?;
    if output.is_empty() {
        println!("No dependencies");
    } else {
        print!("{output}");
    }
    Ok(())
}

/// Renders the tree for `args.root`, or for every top-level parent in the
/// lock when the workspace has no mod definition.
///
/// # Errors
///
/// Returns an error if the workspace mod definition cannot be read.
pub fn render_tree(lock: &WorkspaceLock, args: &TreeArgs) -> Result<String> {
    let map = if args.missing {
        lock.missing_versions()
    } else {
        lock.install_cache()
    };

    let roots = match &args.root {
        Some(root) => vec![root.clone()],
        None => match workspace_mod_name(lock)? {
            Some(name) => vec![name],
            None => top_level_parents(map),
        },
    };
    debug!(roots = ?roots, missing = args.missing, "Rendering dependency tree");

    Ok(roots
        .iter()
        .map(|root| map.dependency_tree(root))
        .filter(|tree| !tree.children().is_empty())
        .map(|tree| tree.to_string())
        .collect())
}

fn workspace_mod_name(lock: &WorkspaceLock) -> Result<Option<String>> {
    let parsed = TomlModParser::new()
        .parse_mod_definition(lock.workspace_path(), lock.options().mod_file_name())?;
    Ok(parsed.value.map(|module| module.name))
}

/// Parents that are not themselves dependency paths (`name@version`).
fn top_level_parents(map: &DependencyVersionMap) -> Vec<String> {
    map.parents()
        .filter(|parent| !parent.contains('@'))
        .map(str::to_string)
        .collect()
}
