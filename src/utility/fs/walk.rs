// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{FsError, ModError, ModResult};
use bon::Builder;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};
use wax::{Glob, Program};

/// Options for parallel file listing.
#[derive(Debug, Clone, Builder)]
pub struct ListOptions {
    /// Globs a file's root-relative path must match (empty = everything)
    #[builder(setters(name = with_include), default)]
    include: Vec<String>,
    /// Globs that drop a file even if it is included
    #[builder(setters(name = with_exclude), default)]
    exclude: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    /// Include hidden files/directories
    #[builder(setters(name = with_include_hidden), default = false)]
    include_hidden: bool,
    /// Respect .gitignore files
    #[builder(setters(name = with_respect_gitignore), default = true)]
    respect_gitignore: bool,
    /// Number of threads (None = auto-detect based on CPU count)
    #[builder(setters(name = with_threads))]
    threads: Option<usize>,
    /// Skip directories matching these names (exact match)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
    /// Fail instead of skipping entries that cannot be read
    #[builder(setters(name = with_require_complete), default = false)]
    require_complete: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ListOptions {
    /// Returns the include globs.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Returns the exclude globs.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Returns the maximum depth to traverse.
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Returns whether to follow symbolic links.
    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Returns whether to include hidden files/directories.
    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Returns whether to respect .gitignore files.
    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Returns the number of threads (None = auto-detect).
    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Returns the skip directories list.
    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }

    /// Returns whether unreadable entries fail the listing.
    #[must_use]
    pub const fn require_complete(&self) -> bool {
        self.require_complete
    }

    /// Options for scanning an install directory for mod definitions.
    ///
    /// Installed mods are vendored content: hidden folders and ignore files
    /// inside them must not hide a definition, and an unreadable folder must
    /// not pass for a missing install.
    #[must_use]
    pub fn for_install_scan(mod_file_name: &str) -> Self {
        Self::builder()
            .with_include(vec![format!("**/{mod_file_name}")])
            .with_include_hidden(true)
            .with_respect_gitignore(false)
            .with_skip_dirs(vec![".git".to_string()])
            .with_require_complete(true)
            .build()
    }
}

/// Compiled include/exclude globs.
#[derive(Debug)]
struct PathFilter {
    include: Vec<Glob<'static>>,
    exclude: Vec<Glob<'static>>,
}

impl PathFilter {
    fn compile(options: &ListOptions) -> ModResult<Self> {
        let compile = |patterns: &[String]| -> ModResult<Vec<Glob<'static>>> {
            patterns
                .iter()
                .map(|pattern| {
                    Glob::new(pattern).map(Glob::into_owned).map_err(|e| {
                        ModError::from(FsError::InvalidPattern {
                            pattern: pattern.clone(),
                            message: e.to_string(),
                        })
                    })
                })
                .collect()
        };

        Ok(Self {
            include: compile(options.include())?,
            exclude: compile(options.exclude())?,
        })
    }

    fn is_match(&self, relative: &Path) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|g| g.is_match(relative));
        included && !self.exclude.iter().any(|g| g.is_match(relative))
    }
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for directory skipping.
fn build_walker(root: &Path, options: &ListOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());

    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());
    builder.ignore(options.respect_gitignore());

    if let Some(threads) = options.threads() {
        builder.threads(threads);
    }

    // Evaluated before descending
    if !options.skip_dirs().is_empty() {
        let skip_dirs: Arc<Vec<String>> = Arc::new(options.skip_dirs().to_vec());
        builder.filter_entry(move |entry| {
            if entry.depth() > 0
                && entry.file_type().is_some_and(|ft| ft.is_dir())
                && let Some(name) = entry.file_name().to_str()
                && skip_dirs.iter().any(|skip| skip == name)
            {
                return false;
            }
            true
        });
    }

    builder
}

/// Lists files under `root` whose root-relative path passes the include and
/// exclude globs, using `ignore::WalkParallel`.
///
/// Results are collected over a flume channel and returned sorted so callers
/// get a deterministic order regardless of thread scheduling.
///
/// # Errors
///
/// Returns an error if the root directory does not exist or a glob is invalid,
/// and, with `require_complete` set, if any entry could not be read.
///
/// # Example
/// ```no_run
/// use modlock::utility::fs::walk::{list_files, ListOptions};
///
/// let options = ListOptions::builder()
///     .with_include(vec!["**/*.toml".to_string()])
///     .with_exclude(vec!["mod.toml".to_string()])
///     .build();
/// let files = list_files("/path/to/mod", &options)?;
/// println!("Found {} resource files", files.len());
/// # Ok::<(), modlock::error::ModError>(())
/// ```
pub fn list_files<P: AsRef<Path>>(root: P, options: &ListOptions) -> ModResult<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Err(FsError::NotFound(root.display().to_string()).into());
    }

    let filter = Arc::new(PathFilter::compile(options)?);

    // Bounded channel to cap memory on huge trees
    let (tx, rx) = bounded::<PathBuf>(1000);
    let error_count = Arc::new(AtomicUsize::new(0));
    let first_error: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
    let root_path = root.to_path_buf();

    let parallel = build_walker(root, options).build_parallel();

    // The walk blocks until done, so drain the channel on this side of it
    let collector = std::thread::spawn(move || {
        let mut files: Vec<PathBuf> = rx.iter().collect();
        files.sort();
        files
    });

    parallel.run(|| {
        let tx = tx.clone();
        let filter = Arc::clone(&filter);
        let root_path = root_path.clone();
        let error_count = Arc::clone(&error_count);
        let first_error = Arc::clone(&first_error);

        Box::new(move |entry_result| {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file())
                        && let Ok(rel_path) = entry.path().strip_prefix(&root_path)
                        && filter.is_match(rel_path)
                    {
                        let _ = tx.send(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "walk error");
                    error_count.fetch_add(1, Ordering::Relaxed);
                    let _ = first_error.set(e.to_string());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let files = collector.join().map_err(|_| {
        ModError::from(FsError::IoError {
            path: root.display().to_string(),
            source: std::io::Error::other("file collector thread panicked"),
        })
    })?;

    let errors = error_count.load(Ordering::Relaxed);
    debug!(
        root = %root.display(),
        files = files.len(),
        errors,
        "listed files"
    );

    if errors > 0 && options.require_complete() {
        return Err(FsError::IncompleteWalk {
            root: root.display().to_string(),
            count: errors,
            first: first_error.get().cloned().unwrap_or_default(),
        }
        .into());
    }

    Ok(files)
}
