// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lock inspection commands.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the tree command.
#[derive(Debug, Clone, Default, Args)]
pub struct TreeArgs {
    /// Root mod name; defaults to the workspace mod.
    #[arg(value_name = "ROOT")]
    pub root: Option<String>,

    /// Shows locked dependencies that are not installed instead.
    #[arg(short = 'm', long)]
    pub missing: bool,
}

/// Arguments for the check command.
#[derive(Debug, Clone, Default, Args)]
pub struct CheckArgs {
    /// Mod directory to load; defaults to the workspace root.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Fails when the load produced warnings.
    #[arg(long = "deny-warnings")]
    pub deny_warnings: bool,
}

/// Arguments for the diff command.
#[derive(Debug, Clone, Args)]
pub struct DiffArgs {
    /// Lock file before the change.
    #[arg(value_name = "BEFORE")]
    pub before: PathBuf,

    /// Lock file after the change.
    #[arg(value_name = "AFTER")]
    pub after: PathBuf,
}
