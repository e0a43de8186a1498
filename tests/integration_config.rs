// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML configurations.

use std::fs;
use std::path::PathBuf;

use modlock::config::Config;
use modlock::config::loader::ConfigLoader;
use modlock::logging::LogLevel;
use tempfile::TempDir;

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_parse_empty_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.workspace.mod_file_name, "mod.toml");
    assert_eq!(config.workspace.install_dir, PathBuf::from(".modules"));
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
}

#[test]
fn config_parse_full() {
    let toml = r#"
[global]
output_log_level = 2
file_log_level = 6
log_file = "logs/modlock.log"

[workspace]
path = "/srv/game"
mod_file_name = "module.toml"
lock_file_name = "module.lock.json"
install_dir = "/var/cache/mods"
fix_legacy_folders = false

[loader]
include = ["**/*.toml", "**/*.res.toml"]
exclude = ["drafts/**"]
create_default_mod = true
"#;
    let config = Config::parse(toml).unwrap();

    assert_eq!(config.global.output_log_level, LogLevel::WARN);
    assert_eq!(config.global.file_log_level, LogLevel::DUMP);
    assert_eq!(config.global.log_file, Some(PathBuf::from("logs/modlock.log")));

    let lock = config.lock_options();
    assert_eq!(lock.mod_file_name(), "module.toml");
    assert_eq!(
        lock.lock_file_path(),
        PathBuf::from("/srv/game/module.lock.json")
    );
    assert_eq!(lock.install_path(), PathBuf::from("/var/cache/mods"));
    assert!(!lock.fix_legacy_folders());

    let loader = config.loader_options();
    assert_eq!(loader.mod_file_name(), "module.toml");
    assert_eq!(loader.include().len(), 2);
    assert!(loader.create_default_mod());
}

#[test]
fn config_parse_rejects_wrong_types() {
    assert!(Config::parse("[workspace]\nfix_legacy_folders = \"maybe\"").is_err());
    assert!(Config::parse("[loader]\ninclude = \"**/*.toml\"").is_err());
}

#[test]
fn config_parse_rejects_unknown_section() {
    let err = Config::parse("[tools]\ncmake = \"cmake\"").unwrap_err();
    assert!(err.to_string().contains("tools"));
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_files_layer_in_order() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("base.toml");
    let local = temp.path().join("local.toml");
    fs::write(
        &base,
        "[workspace]\ninstall_dir = \"base\"\nlock_file_name = \"base.json\"\n",
    )
    .unwrap();
    fs::write(&local, "[workspace]\ninstall_dir = \"local\"\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file(&base)
        .add_toml_file_optional(&local)
        .add_toml_file_optional(temp.path().join("absent.toml"));
    assert_eq!(loader.loaded_files().len(), 2);

    let config = loader.build().unwrap();
    assert_eq!(config.workspace.install_dir, PathBuf::from("local"));
    assert_eq!(config.workspace.lock_file_name, "base.json");
}

#[test]
fn config_overrides_beat_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("modlock.toml");
    fs::write(&path, "[global]\noutput_log_level = 1\n").unwrap();

    let config = ConfigLoader::new()
        .add_toml_file(&path)
        .with_overrides(&["global/output_log_level=4", "loader/create_default_mod=true"])
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert!(config.loader.create_default_mod);
}

#[test]
fn config_malformed_override_is_rejected() {
    let result = ConfigLoader::new().with_overrides(&["no-equals-sign"]);
    assert!(result.is_err());
}

#[test]
fn config_format_loaded_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("modlock.toml");
    fs::write(&path, "").unwrap();

    let lines = ConfigLoader::new()
        .add_toml_file_optional(&path)
        .format_loaded_files();
    assert_eq!(lines, [format!("1. [optional] {}", path.display())]);
}
