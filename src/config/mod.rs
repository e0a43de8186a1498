// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for modlock.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. modlock.toml (cwd)
//! 3. --config
//! 4. MODLOCK_* env vars
//! 5. --set overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! MODLOCK_GLOBAL__OUTPUT_LOG_LEVEL=4     → global.output_log_level = 4
//! MODLOCK_WORKSPACE__PATH=/srv/ws        → workspace.path = "/srv/ws"
//! MODLOCK_LOADER__CREATE_DEFAULT_MOD=1   → loader.create_default_mod = true
//! ```
//!
//! The engine never reads this module directly: [`Config::lock_options`] and
//! [`Config::loader_options`] turn it into the option structs it takes.

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::loader::LoaderOptions;
use crate::lock::WorkspaceLockOptions;

use loader::ConfigLoader;
use types::{GlobalConfig, LoaderConfig, WorkspaceConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Workspace layout.
    pub workspace: WorkspaceConfig,
    /// Resource discovery.
    pub loader: LoaderConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use modlock::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("modlock.toml")
    ///     .with_env_prefix("MODLOCK")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for empty file names or an empty
    /// include list.
    pub fn validate(&self) -> Result<()> {
        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.workspace.mod_file_name.trim().is_empty() {
            return Err(invalid("workspace", "mod_file_name", "must not be empty").into());
        }
        if self.workspace.lock_file_name.trim().is_empty() {
            return Err(invalid("workspace", "lock_file_name", "must not be empty").into());
        }
        if self.loader.include.is_empty() {
            return Err(invalid("loader", "include", "needs at least one glob").into());
        }
        Ok(())
    }

    /// Options for loading the workspace lock.
    #[must_use]
    pub fn lock_options(&self) -> WorkspaceLockOptions {
        self.workspace.lock_options()
    }

    /// Options for the mod loader.
    #[must_use]
    pub fn loader_options(&self) -> LoaderOptions {
        self.loader.loader_options(&self.workspace.mod_file_name)
    }

    /// Format configuration options for display.
    ///
    /// Returns one `key = value` line per option, ordered by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_workspace_options(&mut options);
        self.format_loader_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_workspace_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "workspace.path".into(),
            self.workspace.path.display().to_string(),
        );
        options.insert(
            "workspace.mod_file_name".into(),
            self.workspace.mod_file_name.clone(),
        );
        options.insert(
            "workspace.lock_file_name".into(),
            self.workspace.lock_file_name.clone(),
        );
        options.insert(
            "workspace.install_dir".into(),
            self.workspace.install_dir.display().to_string(),
        );
        options.insert(
            "workspace.fix_legacy_folders".into(),
            self.workspace.fix_legacy_folders.to_string(),
        );
    }

    fn format_loader_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("loader.include".into(), self.loader.include.join(", "));
        options.insert("loader.exclude".into(), self.loader.exclude.join(", "));
        options.insert(
            "loader.create_default_mod".into(),
            self.loader.create_default_mod.to_string(),
        );
    }
}
