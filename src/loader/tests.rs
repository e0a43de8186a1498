// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::{LoaderOptions, ParseContext, load_mod};
use crate::error::ModError;
use crate::lock::{WorkspaceLock, WorkspaceLockOptions};
use crate::modconfig::TomlModParser;
use crate::versions::{DependencyVersion, DependencyVersionMap, ResolvedVersionConstraint};

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn write_mod(dir: &Path, name: &str, requires: &str, resources: &str) {
    write(
        &dir.join("mod.toml"),
        &format!("[mod]\nname = \"{name}\"\n{requires}"),
    );
    if !resources.is_empty() {
        write(&dir.join("resources.toml"), resources);
    }
}

fn semver_entry(name: &str, version: &str, constraint: &str) -> ResolvedVersionConstraint {
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

fn context(workspace: &Path) -> ParseContext {
    let lock = WorkspaceLock::load(WorkspaceLockOptions::for_workspace(workspace)).unwrap();
    ParseContext::new(
        Arc::new(lock),
        Arc::new(TomlModParser::new()),
        LoaderOptions::default(),
    )
}

/// app -> libA (^1.0.0, locked 1.0.3) -> libC (~0.4, locked 0.4.0)
/// app -> libB (branch main, locked abc123)
fn app_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    let modules = ws.join(".modules");

    write_mod(
        ws,
        "app",
        "[[require]]\nname = \"libA\"\nversion = \"^1.0.0\"\n\n[[require]]\nname = \"libB\"\nbranch = \"main\"\n",
        "[query.top_users]\nsql = \"select 1\"\n",
    );
    write_mod(
        &modules.join("libA@v1.0.3"),
        "libA",
        "[[require]]\nname = \"libC\"\nversion = \"~0.4\"\n",
        "[query.top_users]\nsql = \"select 2\"\n",
    );
    write_mod(
        &modules.join("libB@main"),
        "libB",
        "",
        "[dashboard.main]\ntitle = \"Main\"\n",
    );
    write_mod(
        &modules.join("libC@v0.4.0"),
        "libC",
        "",
        "[query.base]\nsql = \"select 3\"\n",
    );

    let mut cache = DependencyVersionMap::new();
    cache.add("app", semver_entry("libA", "1.0.3", "^1.0.0"));
    cache.add(
        "app",
        ResolvedVersionConstraint::new(
            "libB",
            "libB",
            DependencyVersion::Branch {
                branch: "main".to_string(),
                commit: "abc123".to_string(),
            },
            "main",
        ),
    );
    cache.add("libA@v1.0.3", semver_entry("libC", "0.4.0", "~0.4"));
    write_lock(ws, &cache);

    temp
}

#[tokio::test]
async fn test_load_end_to_end() {
    let temp = app_workspace();
    let result = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();

    let module = result.module;
    assert_eq!(module.name, "app");
    assert!(module.dependency_path.is_none());
    assert_eq!(module.mod_count(), 4);
    assert_eq!(module.resources.mod_names(), vec!["app", "libA", "libB", "libC"]);

    let names: Vec<&str> = module.resources.names().collect();
    assert_eq!(
        names,
        vec![
            "app.query.top_users",
            "libA.query.top_users",
            "libB.dashboard.main",
            "libC.query.base",
        ]
    );

    let lib_a = &module.dependencies["libA"];
    assert_eq!(lib_a.dependency_path.as_deref(), Some("libA@v1.0.3"));
    assert_eq!(lib_a.install_cache_key(), "libA@v1.0.3");
    assert!(lib_a.dependencies.contains_key("libC"));

    let lib_b = &module.dependencies["libB"];
    assert_eq!(lib_b.path, temp.path().join(".modules/libB@main"));
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let temp = app_workspace();
    let lock_path = temp.path().join(".mod.cache.json");
    let lock_before = fs::read(&lock_path).unwrap();

    let first = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();
    let second = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();

    assert_eq!(first.module.resources, second.module.resources);
    assert_eq!(first, second);
    assert_eq!(fs::read(&lock_path).unwrap(), lock_before);
}

#[tokio::test]
async fn test_every_missing_dependency_is_reported() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write_mod(
        ws,
        "app",
        "[[require]]\nname = \"libA\"\nversion = \"*\"\n\
         [[require]]\nname = \"libX\"\nversion = \"^1\"\n\
         [[require]]\nname = \"libY\"\nbranch = \"main\"\n",
        "",
    );
    write_mod(&ws.join(".modules/libA@v1.0.0"), "libA", "", "");
    let mut cache = DependencyVersionMap::new();
    cache.add("app", semver_entry("libA", "1.0.0", "*"));
    write_lock(ws, &cache);

    let err = load_mod(ws.to_path_buf(), context(ws)).await.unwrap_err();
    assert!(err.is_missing_dependency());
    assert_eq!(err.errors().len(), 2);
    insta::assert_snapshot!(err.to_string(), @r"
    2 errors occurred:
      * dependency error: dependency 'libX' (^1) required by 'app' is not installed - run 'mod install'
      * dependency error: dependency 'libY' (main) required by 'app' is not installed - run 'mod install'
    ");
}

#[tokio::test]
async fn test_locked_but_uninstalled_is_not_installed() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write_mod(ws, "app", "[[require]]\nname = \"libA\"\nversion = \"^1\"\n", "");
    let mut cache = DependencyVersionMap::new();
    cache.add("app", semver_entry("libA", "1.0.0", "^1"));
    write_lock(ws, &cache);

    let ctx = context(ws);
    assert!(ctx.lock().incomplete());
    let err = load_mod(ws.to_path_buf(), ctx).await.unwrap_err();
    assert!(err.is_missing_dependency());
}

#[tokio::test]
async fn test_requires_without_lock_file() {
    let temp = TempDir::new().unwrap();
    write_mod(
        temp.path(),
        "app",
        "[[require]]\nname = \"libA\"\nversion = \"^1\"\n",
        "",
    );

    let err = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap_err();
    assert!(err.is_missing_dependency());
    insta::assert_snapshot!(
        err.to_string(),
        @"dependency error: mod 'app' has dependencies but no lock file was found - run 'mod install'"
    );
}

#[tokio::test]
async fn test_constraint_violation() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write_mod(ws, "app", "[[require]]\nname = \"libA\"\nversion = \"^2.0.0\"\n", "");
    write_mod(&ws.join(".modules/libA@v1.0.3"), "libA", "", "");
    let mut cache = DependencyVersionMap::new();
    cache.add("app", semver_entry("libA", "1.0.3", "^1.0.0"));
    write_lock(ws, &cache);

    let err = load_mod(ws.to_path_buf(), context(ws)).await.unwrap_err();
    assert!(!err.is_missing_dependency());
    assert!(err.to_string().contains("locked at v1.0.3"));
    assert!(err.to_string().contains("'^2.0.0'"));
}

#[tokio::test]
async fn test_transitive_error_carries_chain() {
    let temp = app_workspace();
    // libC's definition becomes unparsable
    write(
        &temp.path().join(".modules/libC@v0.4.0/mod.toml"),
        "[mod\nname = \"libC\"\n",
    );

    let err = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap_err();
    let ModError::Load(load) = &err else {
        panic!("expected a load error, got {err:?}");
    };
    assert_eq!(load.chain, vec!["app", "libA@v1.0.3", "libC@v0.4.0"]);
    assert!(matches!(load.source, ModError::Parse(_)));
    assert!(
        err.to_string()
            .starts_with("failed to load dependency 'app -> libA@v1.0.3 -> libC@v0.4.0'")
    );
}

#[tokio::test]
async fn test_dependency_cycle_in_lock_is_rejected() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    let modules = ws.join(".modules");
    let require = |name: &str| format!("[[require]]\nname = \"{name}\"\nversion = \"^1\"\n");

    write_mod(ws, "app", &require("a"), "");
    write_mod(&modules.join("a@v1.0.0"), "a", &require("b"), "");
    write_mod(&modules.join("b@v1.0.0"), "b", &require("a"), "");

    let mut cache = DependencyVersionMap::new();
    cache.add("app", semver_entry("a", "1.0.0", "^1"));
    cache.add("a@v1.0.0", semver_entry("b", "1.0.0", "^1"));
    cache.add("b@v1.0.0", semver_entry("a", "1.0.0", "^1"));
    write_lock(ws, &cache);

    let err = load_mod(ws.to_path_buf(), context(ws)).await.unwrap_err();
    assert!(!err.is_missing_dependency());
    assert!(
        err.to_string()
            .contains("dependency cycle: app -> a@v1.0.0 -> b@v1.0.0 -> a@v1.0.0")
    );
}

#[tokio::test]
async fn test_relative_local_path_dependency() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().join("game");
    write_mod(
        &ws,
        "app",
        "[[require]]\nname = \"lib\"\npath = \"../lib\"\n",
        "",
    );
    write_mod(
        &temp.path().join("lib"),
        "lib",
        "",
        "[query.local]\nsql = \"select 1\"\n",
    );

    let mut cache = DependencyVersionMap::new();
    cache.add(
        "app",
        ResolvedVersionConstraint::new(
            "lib",
            "lib",
            DependencyVersion::LocalPath("../lib".into()),
            "file:../lib",
        ),
    );
    write_lock(&ws, &cache);

    let result = load_mod(ws.clone(), context(&ws)).await.unwrap();
    assert_eq!(result.module.mod_count(), 2);
    assert_eq!(result.module.resources.len(), 1);
}

#[tokio::test]
async fn test_missing_definition() {
    let temp = TempDir::new().unwrap();
    let err = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ModError::Parse(_)));
    assert!(err.to_string().starts_with("missing mod definition"));
}

#[tokio::test]
async fn test_default_mod_when_permitted() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scratch");
    write(&dir.join("queries.toml"), "[query.q]\nsql = \"select 1\"\n");

    let lock = WorkspaceLock::load(WorkspaceLockOptions::for_workspace(temp.path())).unwrap();
    let ctx = ParseContext::new(
        Arc::new(lock),
        Arc::new(TomlModParser::new()),
        LoaderOptions::builder().with_create_default_mod(true).build(),
    );

    let result = load_mod(dir, ctx).await.unwrap();
    assert_eq!(result.module.name, "scratch");
    assert!(result.module.resources.contains("scratch.query.q"));
}

#[tokio::test]
async fn test_resource_warnings_are_collected() {
    let temp = app_workspace();
    write(
        &temp.path().join(".modules/libB@main/extra.toml"),
        "stray = true\n",
    );

    let result = load_mod(temp.path().to_path_buf(), context(temp.path()))
        .await
        .unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert!(!result.warnings.has_errors());
}

#[tokio::test]
async fn test_cancelled_load() {
    let temp = app_workspace();
    let token = CancellationToken::new();
    token.cancel();

    let ctx = context(temp.path()).with_cancel_token(token);
    let err = load_mod(temp.path().to_path_buf(), ctx).await.unwrap_err();
    assert!(matches!(err, ModError::Cancelled));
}

#[test]
fn test_context_for_dependency() {
    let root = context(Path::new("/nonexistent-workspace"));
    assert_eq!(root.depth(), 0);
    assert!(root.scope().is_none());

    let resolved = semver_entry("libA", "1.0.3", "^1");
    let child = root.for_dependency("app", &resolved);
    assert_eq!(child.chain(), ["app", "libA@v1.0.3"]);
    assert_eq!(child.depth(), 1);
    assert_eq!(
        child.install_dir(&resolved),
        Path::new("/nonexistent-workspace/.modules/libA@v1.0.3")
    );

    let grandchild = child.for_dependency("libA@v1.0.3", &semver_entry("libC", "0.4.0", "*"));
    assert_eq!(grandchild.chain(), ["app", "libA@v1.0.3", "libC@v0.4.0"]);
    // siblings derive independently
    assert_eq!(child.chain().len(), 2);
    assert!(root.scope().is_none());
}

#[test]
fn test_resource_list_options_skip_install_dir() {
    let options = LoaderOptions::default();
    let list = options.resource_list_options(Path::new("/ws"), Path::new("/ws/.modules"));
    assert_eq!(list.skip_dirs(), [".git", ".modules"]);
    assert_eq!(list.exclude(), ["**/mod.toml"]);

    let outside = options.resource_list_options(Path::new("/ws"), Path::new("/opt/mods"));
    assert_eq!(outside.skip_dirs(), [".git"]);
}
