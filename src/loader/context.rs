// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::Builder;
use tokio_util::sync::CancellationToken;

use crate::error::ModError;
use crate::lock::{DEFAULT_MOD_FILE_NAME, WorkspaceLock};
use crate::modconfig::ModParser;
use crate::utility::fs::walk::ListOptions;
use crate::versions::{DependencyVersion, ResolvedVersionConstraint};

/// Directories never scanned for resource files.
const ALWAYS_SKIPPED_DIRS: &[&str] = &[".git"];

/// How the loader finds definitions and resource files.
#[derive(Debug, Clone, Builder)]
pub struct LoaderOptions {
    /// Mod definition file name
    #[builder(setters(name = with_mod_file_name), into, default = DEFAULT_MOD_FILE_NAME.to_string())]
    mod_file_name: String,
    /// Resource file globs, relative to the mod directory
    #[builder(setters(name = with_include), default = vec!["**/*.toml".to_string()])]
    include: Vec<String>,
    /// Globs excluded from the resource files
    #[builder(setters(name = with_exclude), default)]
    exclude: Vec<String>,
    /// Synthesize a mod for a directory without a definition
    #[builder(setters(name = with_create_default_mod), default = false)]
    create_default_mod: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoaderOptions {
    #[must_use]
    pub fn mod_file_name(&self) -> &str {
        &self.mod_file_name
    }

    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    #[must_use]
    pub const fn create_default_mod(&self) -> bool {
        self.create_default_mod
    }

    /// Listing options for a mod's resource files.
    ///
    /// Definition files are excluded at any depth, as is the install
    /// directory when it lives inside the mod.
    #[must_use]
    pub fn resource_list_options(&self, mod_dir: &Path, install_path: &Path) -> ListOptions {
        let mut exclude = self.exclude.clone();
        exclude.push(format!("**/{}", self.mod_file_name));

        let mut skip_dirs: Vec<String> =
            ALWAYS_SKIPPED_DIRS.iter().map(ToString::to_string).collect();
        if install_path.starts_with(mod_dir)
            && let Some(name) = install_path.file_name().and_then(|n| n.to_str())
        {
            skip_dirs.push(name.to_string());
        }

        ListOptions::builder()
            .with_include(self.include.clone())
            .with_exclude(exclude)
            .with_skip_dirs(skip_dirs)
            .build()
    }
}

/// The dependency a context is loading.
#[derive(Debug, Clone)]
pub struct DependencyScope {
    pub dependency_path: String,
    pub version: DependencyVersion,
}

/// Shared, read-only state plus the per-branch position in the tree.
///
/// Cloning is cheap. Each dependency gets its own derived context, so
/// sibling loads never observe each other's current mod.
#[derive(Clone)]
pub struct ParseContext {
    lock: Arc<WorkspaceLock>,
    parser: Arc<dyn ModParser>,
    options: Arc<LoaderOptions>,
    cancel_token: CancellationToken,
    /// Root mod name followed by dependency paths; empty for the root.
    chain: Vec<String>,
    scope: Option<DependencyScope>,
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("chain", &self.chain)
            .field("scope", &self.scope)
            .field("cancelled", &self.cancel_token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ParseContext {
    /// Root context.
    #[must_use]
    pub fn new(
        lock: Arc<WorkspaceLock>,
        parser: Arc<dyn ModParser>,
        options: LoaderOptions,
    ) -> Self {
        Self {
            lock,
            parser,
            options: Arc::new(options),
            cancel_token: CancellationToken::new(),
            chain: Vec::new(),
            scope: None,
        }
    }

    /// Uses `token` to stop the load.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Context for loading `resolved` as a dependency of `parent_key`.
    #[must_use]
    pub fn for_dependency(&self, parent_key: &str, resolved: &ResolvedVersionConstraint) -> Self {
        let mut chain = if self.chain.is_empty() {
            vec![parent_key.to_string()]
        } else {
            self.chain.clone()
        };
        let dependency_path = resolved.dependency_path();
        chain.push(dependency_path.clone());

        Self {
            chain,
            scope: Some(DependencyScope {
                dependency_path,
                version: resolved.version.clone(),
            }),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn lock(&self) -> &WorkspaceLock {
        &self.lock
    }

    #[must_use]
    pub fn parser(&self) -> &dyn ModParser {
        self.parser.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    #[must_use]
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Nesting depth; 0 for the root mod.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// The dependency being loaded, `None` for the root.
    #[must_use]
    pub const fn scope(&self) -> Option<&DependencyScope> {
        self.scope.as_ref()
    }

    /// Attaches this context's dependency chain to an error raised while
    /// loading it. Errors at the root are returned unchanged.
    #[must_use]
    pub fn wrap(&self, error: ModError) -> ModError {
        if self.chain.is_empty() {
            error
        } else {
            error.with_chain(&self.chain)
        }
    }

    /// Where `resolved` is installed.
    ///
    /// Relative local paths resolve against the workspace.
    #[must_use]
    pub fn install_dir(&self, resolved: &ResolvedVersionConstraint) -> PathBuf {
        match resolved.version.local_path() {
            Some(path) => self.lock.local_dir(path),
            None => resolved.install_dir(&self.lock.install_path()),
        }
    }
}
