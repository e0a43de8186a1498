// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mod parsers.
//!
//! The loader only sees the [`ModParser`] trait. [`TomlModParser`] reads a
//! small TOML format:
//!
//! ```text
//! mod.toml                     resources/*.toml
//!   [mod]                        [query.top_users]      -> <mod>.query.top_users
//!   name = "app"                 sql = "select ..."
//!   [[require]]
//!   name = "libA"                [dashboard.main]       -> <mod>.dashboard.main
//!   version = "^1.0.0"           title = "Main"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::diagnostic::{Diagnostic, Diagnostics, Parsed};
use super::types::{Mod, Require, Resource, ResourceMap};
use crate::error::{FsError, ModResult};

/// Parses mod definitions and resource files.
///
/// Implementations are shared across concurrent load tasks.
pub trait ModParser: Send + Sync {
    /// Parses the definition file `mod_file_name` in `dir`.
    ///
    /// Returns `Ok` with a `None` value when the directory has no
    /// definition. Syntax problems are reported as error diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition exists but cannot be read.
    fn parse_mod_definition(&self, dir: &Path, mod_file_name: &str)
    -> ModResult<Parsed<Option<Mod>>>;

    /// Parses `files` as resources declared by `module`.
    fn parse_mod_resources(&self, module: &Mod, files: &[PathBuf]) -> Parsed<ResourceMap>;
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModFile {
    #[serde(rename = "mod")]
    definition: ModSection,
    #[serde(default)]
    require: Vec<Require>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModSection {
    name: String,
    #[serde(default)]
    title: Option<String>,
}

/// Reference parser for the TOML mod format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlModParser;

impl TomlModParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn parse_resource_file(
        module: &Mod,
        file: &Path,
        resources: &mut ResourceMap,
        diagnostics: &mut Diagnostics,
    ) {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                diagnostics.push(Diagnostic::error(format!("cannot read file: {e}")).in_file(file));
                return;
            }
        };

        let table: toml::Table = match toml::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                diagnostics.push(syntax_error(&content, &e, file));
                return;
            }
        };

        for (kind, value) in table {
            let toml::Value::Table(named) = value else {
                diagnostics.push(
                    Diagnostic::warning(format!("ignoring unknown top-level key '{kind}'"))
                        .in_file(file),
                );
                continue;
            };

            for (name, body) in named {
                let toml::Value::Table(attributes) = body else {
                    diagnostics.push(
                        Diagnostic::warning(format!(
                            "ignoring '{kind}.{name}': resources must be tables"
                        ))
                        .in_file(file),
                    );
                    continue;
                };

                let resource = Resource {
                    mod_name: module.name.clone(),
                    kind: kind.clone(),
                    name,
                    file: file.to_path_buf(),
                    attributes,
                };
                if let Some(collision) = resources.insert(resource) {
                    diagnostics.push(collision);
                }
            }
        }
    }
}

impl ModParser for TomlModParser {
    fn parse_mod_definition(
        &self,
        dir: &Path,
        mod_file_name: &str,
    ) -> ModResult<Parsed<Option<Mod>>> {
        let file = dir.join(mod_file_name);
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Parsed::new(None)),
            Err(e) => {
                return Err(FsError::IoError {
                    path: file.display().to_string(),
                    source: e,
                }
                .into());
            }
        };

        match toml::from_str::<ModFile>(&content) {
            Ok(parsed) => {
                debug!(
                    file = %file.display(),
                    name = %parsed.definition.name,
                    requires = parsed.require.len(),
                    "Parsed mod definition"
                );
                let mut module = Mod::new(parsed.definition.name, dir);
                module.title = parsed.definition.title;
                module.requires = parsed.require;
                Ok(Parsed::new(Some(module)))
            }
            Err(e) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(syntax_error(&content, &e, &file));
                Ok(Parsed::with_diagnostics(None, diagnostics))
            }
        }
    }

    fn parse_mod_resources(&self, module: &Mod, files: &[PathBuf]) -> Parsed<ResourceMap> {
        let mut resources = ResourceMap::new();
        let mut diagnostics = Diagnostics::new();
        for file in files {
            Self::parse_resource_file(module, file, &mut resources, &mut diagnostics);
        }
        debug!(
            module = %module.name,
            files = files.len(),
            resources = resources.len(),
            "Parsed mod resources"
        );
        Parsed::with_diagnostics(resources, diagnostics)
    }
}

fn syntax_error(content: &str, error: &toml::de::Error, file: &Path) -> Diagnostic {
    let diagnostic = Diagnostic::error(error.message().to_string()).in_file(file);
    match error.span() {
        Some(span) => diagnostic.at_line(line_of(content, span.start)),
        None => diagnostic,
    }
}

/// 1-based line containing byte `offset`.
fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}
