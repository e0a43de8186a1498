// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                 ModError (~24 bytes)
//!                        |
//!   +------+------+------+------+------+------+------+
//!   |      |      |      |      |      |      |      |
//!   v      v      v      v      v      v      v      v
//! Lock   Dep   Parse   Cfg    Fs    Load  Multi  Cancelled/Io
//!  Box   Box    Box    Box    Box    Box   Box
//!
//! Sub-errors (unboxed internally):
//!   Lock        ReadFailed, Malformed, WriteFailed, InvalidEntry
//!   Dependency  NotInstalled, NoLockFile, ConstraintViolation, ...
//!   Parse       MissingModDefinition, Diagnostics
//!   Config      ParseError, MissingKey, InvalidValue
//!   Fs          NotFound, IoError
//!   Load        child error + dependency chain (root -> .. -> failing)
//!   Multiple    every sibling failure of a concurrent fan-out
//! ```

use std::fmt;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ModError`].
pub type ModResult<T> = std::result::Result<T, ModError>;

/// Top-level engine error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum ModError {
    /// Lock file could not be read, parsed or written.
    #[error("lock error: {0}")]
    Lock(#[from] Box<LockError>),

    /// A dependency is missing or does not satisfy its constraint.
    #[error("dependency error: {0}")]
    Dependency(#[from] Box<DependencyError>),

    /// Mod or resource definitions failed to parse.
    #[error("{0}")]
    Parse(#[from] Box<ParseError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// A dependency failed to load; carries the chain from the root mod.
    #[error("{0}")]
    Load(#[from] Box<LoadError>),

    /// Several independent failures collected from concurrent loads.
    #[error("{0}")]
    Multiple(#[from] Box<MultiError>),

    /// The load was cancelled before it completed.
    #[error("load cancelled")]
    Cancelled,

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ModError {
                fn from(err: $error) -> Self {
                    ModError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    LockError => Lock,
    DependencyError => Dependency,
    ParseError => Parse,
    ConfigError => Config,
    FsError => Fs,
    LoadError => Load,
    MultiError => Multiple,
    std::io::Error => Io,
}

impl ModError {
    /// Combines a list of errors into one.
    ///
    /// Nested multi-errors are flattened. A single error is returned as-is.
    #[must_use]
    pub fn combine(errors: Vec<Self>) -> Option<Self> {
        let mut flat = Vec::with_capacity(errors.len());
        for error in errors {
            match error {
                Self::Multiple(multi) => flat.extend(multi.errors),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(MultiError { errors: flat }.into()),
        }
    }

    /// Wraps this error with the dependency chain that led to it.
    ///
    /// Errors that already carry a chain (or are collections of such errors)
    /// are returned untouched so the innermost chain is preserved.
    #[must_use]
    pub fn with_chain(self, chain: &[String]) -> Self {
        match self {
            Self::Load(_) | Self::Multiple(_) | Self::Cancelled => self,
            other => LoadError {
                chain: chain.to_vec(),
                source: other,
            }
            .into(),
        }
    }

    /// Returns `true` if this error (or every error it collects) is a
    /// missing-dependency error that a `mod install` would fix.
    #[must_use]
    pub fn is_missing_dependency(&self) -> bool {
        match self {
            Self::Dependency(e) => matches!(
                **e,
                DependencyError::NotInstalled { .. } | DependencyError::NoLockFile { .. }
            ),
            Self::Load(e) => e.source.is_missing_dependency(),
            Self::Multiple(m) => m.errors.iter().all(Self::is_missing_dependency),
            _ => false,
        }
    }

    /// Returns the individual errors: the collected list for
    /// [`ModError::Multiple`], otherwise just this error.
    #[must_use]
    pub fn errors(&self) -> Vec<&Self> {
        match self {
            Self::Multiple(m) => m.errors.iter().collect(),
            other => vec![other],
        }
    }
}

// --- Lock Errors ---

/// Persisted lock errors.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file exists but could not be read.
    #[error("failed to read lock file '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Lock file content is not a valid lock.
    #[error("failed to parse lock file '{path}': {message}")]
    Malformed { path: String, message: String },

    /// Lock file could not be written.
    #[error("failed to write lock file '{path}': {message}")]
    WriteFailed { path: String, message: String },

    /// A lock entry does not carry exactly one resolved version.
    #[error("invalid lock entry '{name}': {message}")]
    InvalidEntry { name: String, message: String },
}

// --- Dependency Errors ---

/// Dependency resolution errors.
#[derive(Debug, Error)]
pub enum DependencyError {
    /// A required dependency has no installed version.
    #[error("dependency '{name}' ({constraint}) required by '{parent}' is not installed - run 'mod install'")]
    NotInstalled {
        name: String,
        constraint: String,
        parent: String,
    },

    /// A mod declares dependencies but the workspace has no lock file.
    #[error("mod '{parent}' has dependencies but no lock file was found - run 'mod install'")]
    NoLockFile { parent: String },

    /// The locked version does not satisfy the declared constraint.
    #[error(
        "dependency '{dependency_path}' is locked at {locked} which does not satisfy constraint '{constraint}' required by '{parent}' - run 'mod install' to update the installed version"
    )]
    ConstraintViolation {
        dependency_path: String,
        locked: String,
        constraint: String,
        parent: String,
    },

    /// The lock leads back to a mod already being loaded.
    #[error("dependency cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

        /// A require declaration is malformed.
    #[error("invalid require '{name}' in '{parent}': {message}")]
    InvalidRequire {
        name: String,
        parent: String,
        message: String,
    },

    /// A constraint expression could not be parsed.
    #[error("invalid version constraint '{constraint}' for '{name}': {message}")]
    InvalidConstraint {
        name: String,
        constraint: String,
        message: String,
    },
}

// --- Parse Errors ---

/// Mod and resource parsing errors.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The directory has no mod definition file.
    #[error("missing mod definition: no '{file_name}' found in '{path}'")]
    MissingModDefinition { path: String, file_name: String },

    /// The parser reported error diagnostics.
    #[error("failed to parse mod '{mod_name}':\n{diagnostics}")]
    Diagnostics {
        mod_name: String,
        diagnostics: String,
    },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// Include or exclude glob could not be compiled.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Some entries under a root could not be read.
    #[error("failed to read {count} entries under '{root}': {first}")]
    IncompleteWalk {
        root: String,
        count: usize,
        first: String,
    },

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Load Errors ---

/// A child mod failed to load.
#[derive(Debug, Error)]
#[error("failed to load dependency '{}': {source}", .chain.join(" -> "))]
pub struct LoadError {
    /// Dependency paths from the root mod to the failing mod.
    pub chain: Vec<String>,
    /// The underlying failure.
    pub source: ModError,
}

/// Errors collected from sibling loads.
#[derive(Debug)]
pub struct MultiError {
    errors: Vec<ModError>,
}

impl MultiError {
    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> &[ModError] {
        &self.errors
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  * {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
