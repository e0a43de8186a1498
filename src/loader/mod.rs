// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recursive mod loader.
//!
//! ```text
//! load_mod(dir, ctx)
//!   1. parse definition            none -> default mod | MissingModDefinition
//!   2. requires?  no  ------------------------------------------------+
//!                 yes -> lock file required (NoLockFile)              |
//!   3. per require: constraint -> locked version -> install dir       |
//!        JoinSet::spawn(load_mod(dep_dir, ctx.for_dependency(..)))    |
//!        join all; every failure collected into one error             |
//!   4. own resource files -> ResourceMap  <---------------------------+
//!      merge children (sorted by name) into resources + dependencies
//! ```
//!
//! Each task returns its loaded mod and the parent inserts the results after
//! the join, so no map is shared between tasks.

pub mod context;

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error};

pub use context::{DependencyScope, LoaderOptions, ParseContext};

use crate::error::{DependencyError, ModError, ModResult, ParseError};
use crate::logging::mod_load_span;
use crate::modconfig::{Diagnostics, Mod, ResourceMap};
use crate::utility::fs::walk::list_files;

/// A loaded mod tree and the warnings collected across it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub module: Mod,
    pub warnings: Diagnostics,
}

/// Loads the mod in `dir` and, recursively, every dependency it requires.
///
/// The returned mod's resources include those of all transitive
/// dependencies. If any dependency fails, every sibling still runs to
/// completion and all failures are returned together; a partially loaded
/// mod is never returned.
///
/// # Errors
///
/// Returns the combined load errors: missing definitions, parser error
/// diagnostics, missing or unsatisfied dependencies, or `Cancelled`.
pub fn load_mod(dir: PathBuf, ctx: ParseContext) -> BoxFuture<'static, ModResult<LoadResult>> {
    let label = ctx
        .scope()
        .map_or_else(|| dir.display().to_string(), |s| s.dependency_path.clone());
    let span = mod_load_span(&label, ctx.depth());
    async move { load_mod_inner(dir, ctx).await }
        .instrument(span)
        .boxed()
}

async fn load_mod_inner(dir: PathBuf, ctx: ParseContext) -> ModResult<LoadResult> {
    if ctx.is_cancelled() {
        return Err(ModError::Cancelled);
    }

    let mut warnings = Diagnostics::new();
    let mut module = parse_definition(&dir, &ctx, &mut warnings).map_err(|e| ctx.wrap(e))?;
    if let Some(scope) = ctx.scope() {
        module.dependency_path = Some(scope.dependency_path.clone());
        module.version = Some(scope.version.clone());
    }

    let children = if module.has_requires() {
        load_dependencies(&module, &ctx).await?
    } else {
        Vec::new()
    };

    let own = parse_resources(&module, &ctx, &mut warnings).map_err(|e| ctx.wrap(e))?;
    module.resources = own;

    let mut collisions = Diagnostics::new();
    for (name, child) in children {
        collisions.extend(module.resources.merge(&child.module.resources));
        warnings.extend(child.warnings);
        module.dependencies.insert(name, child.module);
    }
    if collisions.has_errors() {
        return Err(ctx.wrap(diagnostics_error(&module, collisions)));
    }

    debug!(
        module = %module,
        dependencies = module.dependencies.len(),
        resources = module.resources.len(),
        "Loaded mod"
    );
    Ok(LoadResult { module, warnings })
}

fn parse_definition(
    dir: &Path,
    ctx: &ParseContext,
    warnings: &mut Diagnostics,
) -> ModResult<Mod> {
    let file_name = ctx.options().mod_file_name();
    let parsed = ctx.parser().parse_mod_definition(dir, file_name)?;

    let (errors, parse_warnings) = parsed.diagnostics.partition();
    if errors.has_errors() {
        return Err(ParseError::Diagnostics {
            mod_name: dir.display().to_string(),
            diagnostics: errors.to_string(),
        }
        .into());
    }
    warnings.extend(parse_warnings);

    match parsed.value {
        Some(module) => Ok(module),
        None if ctx.options().create_default_mod() => {
            debug!(path = %dir.display(), "No mod definition, using default mod");
            Ok(Mod::default_for(dir))
        }
        None => Err(ParseError::MissingModDefinition {
            path: dir.display().to_string(),
            file_name: file_name.to_string(),
        }
        .into()),
    }
}

fn parse_resources(
    module: &Mod,
    ctx: &ParseContext,
    warnings: &mut Diagnostics,
) -> ModResult<ResourceMap> {
    let list_options = ctx
        .options()
        .resource_list_options(&module.path, &ctx.lock().install_path());
    let files = list_files(&module.path, &list_options)?;
    let parsed = ctx.parser().parse_mod_resources(module, &files);

    let (errors, parse_warnings) = parsed.diagnostics.partition();
    if errors.has_errors() {
        return Err(diagnostics_error(module, errors));
    }
    warnings.extend(parse_warnings);
    Ok(parsed.value)
}

fn diagnostics_error(module: &Mod, diagnostics: Diagnostics) -> ModError {
    ParseError::Diagnostics {
        mod_name: module.install_cache_key().to_string(),
        diagnostics: diagnostics.to_string(),
    }
    .into()
}

/// Loads every require of `module` concurrently.
///
/// Returns the children sorted by dependency name.
async fn load_dependencies(
    module: &Mod,
    ctx: &ParseContext,
) -> ModResult<Vec<(String, LoadResult)>> {
    let parent = module.install_cache_key();
    if !ctx.lock().lock_file_exists() {
        return Err(ctx.wrap(
            DependencyError::NoLockFile {
                parent: parent.to_string(),
            }
            .into(),
        ));
    }

    let mut errors = Vec::new();
    let mut set = JoinSet::new();

    for require in &module.requires {
        if ctx.is_cancelled() {
            break;
        }

        let resolved = require.constraint(parent).and_then(|constraint| {
            ctx.lock()
                .ensure_locked_mod_version(&constraint, parent)?
                .cloned()
                .ok_or_else(|| {
                    DependencyError::NotInstalled {
                        name: require.name.clone(),
                        constraint: constraint.raw().to_string(),
                        parent: parent.to_string(),
                    }
                    .into()
                })
        });

        let resolved = resolved.and_then(|resolved| {
            let path = resolved.dependency_path();
            if path == parent || ctx.chain().contains(&path) {
                let mut chain = if ctx.chain().is_empty() {
                    vec![parent.to_string()]
                } else {
                    ctx.chain().to_vec()
                };
                chain.push(path);
                return Err(DependencyError::Cycle { chain }.into());
            }
            Ok(resolved)
        });

        match resolved {
            Ok(resolved) => {
                let dir = ctx.install_dir(&resolved);
                let child_ctx = ctx.for_dependency(parent, &resolved);
                let name = require.name.clone();
                debug!(parent = %parent, dependency = %resolved.dependency_path(), "Loading dependency");
                set.spawn(async move { (name, load_mod(dir, child_ctx).await) });
            }
            Err(e) => errors.push(ctx.wrap(e)),
        }
    }

    // Wait for all and collect errors
    let mut children = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((name, Ok(child))) => children.push((name, child)),
            Ok((_, Err(e))) => errors.push(e),
            Err(e) => errors.push(ctx.wrap(ModError::from(io::Error::other(format!(
                "load task panicked: {e}"
            ))))),
        }
    }

    if ctx.is_cancelled() {
        return Err(ModError::Cancelled);
    }

    let failed = errors.len();
    if let Some(combined) = ModError::combine(errors) {
        for (i, e) in combined.errors().iter().enumerate().skip(1) {
            error!(error = %e, index = i + 1, "Additional dependency load error");
        }
        debug!(parent = %parent, failed, "Dependency loads failed");
        return Err(combined);
    }

    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}
