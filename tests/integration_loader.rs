// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the recursive mod loader.
//!
//! Each test lays out a workspace on disk: a root mod, installed
//! dependencies under `.modules/` and a lock file pinning them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modlock::cli::lock::CheckArgs;
use modlock::cmd::check::check_workspace;
use modlock::config::Config;
use modlock::error::ModError;
use modlock::loader::{LoaderOptions, ParseContext, load_mod};
use modlock::lock::{WorkspaceLock, WorkspaceLockOptions};
use modlock::modconfig::TomlModParser;
use modlock::versions::{DependencyVersion, DependencyVersionMap, ResolvedVersionConstraint};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn require(name: &str, version: &str) -> String {
    format!("[[require]]\nname = \"{name}\"\nversion = \"{version}\"\n\n")
}

fn write_mod(dir: &Path, name: &str, requires: &str, resources: &str) {
    write(
        &dir.join("mod.toml"),
        &format!("[mod]\nname = \"{name}\"\n\n{requires}"),
    );
    if !resources.is_empty() {
        write(&dir.join("resources.toml"), resources);
    }
}

fn entry(name: &str, version: &str, constraint: &str) -> ResolvedVersionConstraint {
    ResolvedVersionConstraint::new(
        name,
        name,
        DependencyVersion::parse_semver(version).unwrap(),
        constraint,
    )
}

fn write_lock(workspace: &Path, cache: &DependencyVersionMap) {
    write(
        &workspace.join(".mod.cache.json"),
        &serde_json::to_string_pretty(cache).unwrap(),
    );
}

fn config_for(workspace: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.path = workspace.to_path_buf();
    config
}

fn context(workspace: &Path) -> ParseContext {
    let lock = WorkspaceLock::load(WorkspaceLockOptions::for_workspace(workspace)).unwrap();
    ParseContext::new(
        Arc::new(lock),
        Arc::new(TomlModParser::new()),
        LoaderOptions::default(),
    )
}

/// app -> a (^1) -> shared (^2, locked 2.1.0)
/// app -> b (^1) -> shared (^2, locked 2.1.0)
fn diamond_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    let modules = ws.join(".modules");

    write_mod(
        ws,
        "app",
        &(require("a", "^1") + &require("b", "^1")),
        "[view.home]\ntitle = \"Home\"\n",
    );
    write_mod(
        &modules.join("a@v1.0.0"),
        "a",
        &require("shared", "^2"),
        "[view.a]\ntitle = \"A\"\n",
    );
    write_mod(
        &modules.join("b@v1.2.0"),
        "b",
        &require("shared", "^2"),
        "[view.b]\ntitle = \"B\"\n",
    );
    write_mod(
        &modules.join("shared@v2.1.0"),
        "shared",
        "",
        "[query.common]\nsql = \"select 1\"\n",
    );

    let mut cache = DependencyVersionMap::new();
    cache.add("app", entry("a", "1.0.0", "^1"));
    cache.add("app", entry("b", "1.2.0", "^1"));
    cache.add("a@v1.0.0", entry("shared", "2.1.0", "^2"));
    cache.add("b@v1.2.0", entry("shared", "2.1.0", "^2"));
    write_lock(ws, &cache);

    temp
}

// =============================================================================
// Workspace check
// =============================================================================

#[tokio::test]
async fn check_diamond_dependencies() {
    let temp = diamond_workspace();
    let report = check_workspace(&CheckArgs::default(), &config_for(temp.path()))
        .await
        .unwrap();

    assert_eq!(report.mod_name, "app");
    // app, a, b and shared loaded once under each parent
    assert_eq!(report.mod_count, 5);
    assert_eq!(report.resource_count, 4);
    assert!(report.missing.is_empty());
    assert!(report.is_clean(true));
}

#[tokio::test]
async fn check_reports_missing_install_with_hint() {
    let temp = diamond_workspace();
    fs::remove_dir_all(temp.path().join(".modules/shared@v2.1.0")).unwrap();

    let err = check_workspace(&CheckArgs::default(), &config_for(temp.path()))
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.starts_with("Dependencies are missing; run 'mod install' first"));
    assert!(message.contains("2 errors occurred"));
    assert!(message.contains("app -> a@v1.0.0"));
    assert!(message.contains("app -> b@v1.2.0"));
}

#[tokio::test]
async fn check_relative_dir_is_taken_from_workspace() {
    let temp = diamond_workspace();
    let args = CheckArgs {
        dir: Some(PathBuf::from(".modules/shared@v2.1.0")),
        deny_warnings: false,
    };

    let report = check_workspace(&args, &config_for(temp.path()))
        .await
        .unwrap();
    assert_eq!(report.mod_name, "shared");
    assert_eq!(report.mod_count, 1);
}

#[tokio::test]
async fn check_deny_warnings() {
    let temp = diamond_workspace();
    write(
        &temp.path().join("extra.toml"),
        "version = 3\n\n[view.extra]\ntitle = \"Extra\"\n",
    );

    let report = check_workspace(&CheckArgs::default(), &config_for(temp.path()))
        .await
        .unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.is_clean(false));
    assert!(!report.is_clean(true));
}

#[tokio::test]
async fn check_with_config_file() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write_mod(ws, "app", &require("lib", "~0.3"), "");
    write_mod(&ws.join("vendor/lib@v0.3.7"), "lib", "", "[query.q]\nsql = \"x\"\n");
    let mut cache = DependencyVersionMap::new();
    cache.add("app", entry("lib", "0.3.7", "~0.3"));
    write(
        &ws.join("deps.json"),
        &serde_json::to_string_pretty(&cache).unwrap(),
    );

    let config_path = ws.join("modlock.toml");
    write(
        &config_path,
        &format!(
            "[workspace]\npath = '{}'\nlock_file_name = \"deps.json\"\ninstall_dir = \"vendor\"\n",
            ws.display()
        ),
    );

    let config = Config::from_file(&config_path).unwrap();
    let report = check_workspace(&CheckArgs::default(), &config)
        .await
        .unwrap();
    assert_eq!(report.mod_count, 2);
    assert_eq!(report.resource_count, 1);
}

// =============================================================================
// Loader behaviour
// =============================================================================

#[tokio::test]
async fn load_many_dependencies_concurrently() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();

    let names: Vec<String> = (0..24).map(|i| format!("lib{i:02}")).collect();
    let requires: String = names.iter().map(|n| require(n, "^1")).collect();
    write_mod(ws, "app", &requires, "");

    let mut cache = DependencyVersionMap::new();
    for name in &names {
        write_mod(
            &ws.join(".modules").join(format!("{name}@v1.0.0")),
            name,
            "",
            &format!("[query.{name}]\nsql = \"select 1\"\n"),
        );
        cache.add("app", entry(name, "1.0.0", "^1"));
    }
    write_lock(ws, &cache);

    let result = load_mod(ws.to_path_buf(), context(ws)).await.unwrap();
    let module = result.module;
    assert_eq!(module.mod_count(), 25);
    assert_eq!(module.resources.len(), 24);
    let loaded: Vec<&String> = module.dependencies.keys().collect();
    assert_eq!(loaded, names.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn load_conflicting_resource_versions_fails() {
    let temp = diamond_workspace();
    let ws = temp.path();

    // b now pins a different shared whose resource differs
    write_mod(
        &ws.join(".modules/shared@v2.2.0"),
        "shared",
        "",
        "[query.common]\nsql = \"select 2\"\n",
    );
    let mut cache = DependencyVersionMap::new();
    cache.add("app", entry("a", "1.0.0", "^1"));
    cache.add("app", entry("b", "1.2.0", "^1"));
    cache.add("a@v1.0.0", entry("shared", "2.1.0", "^2"));
    cache.add("b@v1.2.0", entry("shared", "2.2.0", "^2"));
    write_lock(ws, &cache);

    let err = load_mod(ws.to_path_buf(), context(ws)).await.unwrap_err();
    assert!(!err.is_missing_dependency());
    assert!(err.to_string().contains("duplicate resource 'shared.query.common'"));
}

#[tokio::test]
async fn load_cancelled_before_start() {
    let temp = diamond_workspace();
    let token = CancellationToken::new();
    token.cancel();

    let ctx = context(temp.path()).with_cancel_token(token);
    let err = load_mod(temp.path().to_path_buf(), ctx).await.unwrap_err();
    assert!(matches!(err, ModError::Cancelled));
}

#[tokio::test]
async fn load_is_read_only() {
    let temp = diamond_workspace();
    let lock_path = temp.path().join(".mod.cache.json");
    let before = fs::read(&lock_path).unwrap();

    load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();
    load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();

    assert_eq!(fs::read(&lock_path).unwrap(), before);
}
