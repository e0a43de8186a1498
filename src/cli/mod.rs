// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for modlock using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! modlock [global options] <command>
//! tree [root] [--missing]
//! check [dir] [--deny-warnings]
//! diff <before> <after>
//! options
//! inis
//! version
//! ```

pub mod global;
pub mod lock;


use crate::cli::global::GlobalOptions;
use crate::cli::lock::{CheckArgs, DiffArgs, TreeArgs};
use clap::{Parser, Subcommand};

/// Mod dependency lock engine
///
/// Inspects the install lock of a mod workspace.
#[derive(Debug, Parser)]
#[command(
    name = "modlock",
    author,
    version,
    about = "Mod dependency lock engine",
    long_about = "modlock Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Reads the install lock of a mod workspace, checks it against\n\
                  the installed dependencies and loads the mod tree it pins.\n\n\
                  `modlock check` loads the workspace mod and every dependency.\n\
                  `modlock tree` prints what the lock pins. See\n\
                  `modlock <command> --help` for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  modlock reads `modlock.toml` from the current directory if it\n\
                  exists. Additional files can be given with --config; they are\n\
                  loaded in order and later files override earlier ones.\n\
                  MODLOCK_<SECTION>__<KEY> environment variables and --set come\n\
                  last. Use --no-default-config to skip `modlock.toml`."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the config files used.
    Inis,

    /// Prints the dependency tree pinned by the lock.
    Tree(TreeArgs),

    /// Loads the workspace mod and all its dependencies.
    Check(CheckArgs),

    /// Compares two lock files.
    Diff(DiffArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
