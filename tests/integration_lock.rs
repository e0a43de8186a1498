// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the workspace lock.
//!
//! Lock files are written as raw JSON, the way an installer leaves them.

use std::fs;
use std::path::Path;

use modlock::cli::lock::TreeArgs;
use modlock::cmd::diff::diff_lock_files;
use modlock::cmd::tree::render_tree;
use modlock::lock::{WorkspaceLock, WorkspaceLockOptions};
use modlock::versions::{DependencyVersion, DependencyVersionMap, ModVersionConstraint};
use tempfile::TempDir;

const LOCK: &str = r#"{
  "app": {
    "libA": {
      "name": "libA",
      "version": "1.0.3",
      "constraint": "^1.0.0",
      "git_ref": "refs/tags/v1.0.3",
      "struct_version": 20240601
    },
    "libB": {
      "name": "libB",
      "branch": "feature/x",
      "commit": "0123456789abcdef",
      "constraint": "feature/x",
      "struct_version": 20240601
    }
  },
  "libA@v1.0.3": {
    "libC": {
      "name": "libC",
      "version": "0.4.0",
      "constraint": "~0.4",
      "struct_version": 20240601
    }
  }
}
"#;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn install(workspace: &Path, folder: &str, name: &str) {
    write(
        &workspace.join(".modules").join(folder).join("mod.toml"),
        &format!("[mod]\nname = \"{name}\"\n"),
    );
}

/// libA and libB installed, libC locked but missing.
fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write(&ws.join("mod.toml"), "[mod]\nname = \"app\"\n");
    write(&ws.join(".mod.cache.json"), LOCK);
    install(ws, "libA@v1.0.3", "libA");
    install(ws, "libB@feature-x", "libB");
    temp
}

fn load(ws: &Path) -> WorkspaceLock {
    WorkspaceLock::load(WorkspaceLockOptions::for_workspace(ws)).unwrap()
}

// =============================================================================
// Loading and reconciliation
// =============================================================================

#[test]
fn lock_load_reconciles_with_install_dir() {
    let temp = workspace();
    let lock = load(temp.path());

    assert!(lock.lock_file_exists());
    assert!(lock.incomplete());
    assert!(!lock.requires_full_reinstall());
    assert!(lock.get_mod("libA", "app").is_some());
    assert!(lock.get_mod("libB", "app").is_some());
    assert!(lock.get_mod("libC", "libA@v1.0.3").is_none());
    assert!(lock.missing_versions().get("libA@v1.0.3", "libC").is_some());
    assert_eq!(lock.installed_versions("libB"), vec!["feature-x"]);
}

#[test]
fn lock_installing_missing_folder_completes_lock() {
    let temp = workspace();
    install(temp.path(), "libC@v0.4.0", "libC");

    let lock = load(temp.path());
    assert!(!lock.incomplete());
    let found = lock.find_mod("libC").unwrap();
    assert_eq!(found.version, DependencyVersion::parse_semver("0.4.0").unwrap());
}

#[test]
fn lock_constraint_lookup() {
    let temp = workspace();
    let lock = load(temp.path());

    let ok = ModVersionConstraint::semver("libA", "^1.0").unwrap();
    assert!(lock.ensure_locked_mod_version(&ok, "app").unwrap().is_some());

    let too_new = ModVersionConstraint::semver("libA", ">=1.1").unwrap();
    let err = lock.ensure_locked_mod_version(&too_new, "app").unwrap_err();
    assert!(!err.is_missing_dependency());
    assert!(err.to_string().contains("does not satisfy constraint '>=1.1'"));

    let other_branch = ModVersionConstraint::branch("libB", "main");
    assert!(lock.ensure_locked_mod_version(&other_branch, "app").is_err());

    let unlocked = ModVersionConstraint::semver("libZ", "*").unwrap();
    assert!(lock.ensure_locked_mod_version(&unlocked, "app").unwrap().is_none());
}

#[test]
fn lock_legacy_folder_is_fixed_on_load() {
    let temp = workspace();
    install(temp.path(), "libC@v0.4", "libC");

    let lock = load(temp.path());
    assert!(!lock.incomplete());
    assert!(temp.path().join(".modules/libC@v0.4.0").is_dir());
    assert!(!temp.path().join(".modules/libC@v0.4").exists());
}

#[test]
fn lock_legacy_schema_needs_reinstall() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join(".mod.cache.json"),
        r#"{"app": {"libA": {"name": "libA", "version": "1.0.3", "constraint": "^1"}}}"#,
    );
    install(temp.path(), "libA@v1.0.3", "libA");

    let lock = load(temp.path());
    assert!(lock.requires_full_reinstall());
    assert!(!lock.incomplete());
}

#[test]
fn lock_rejects_invalid_entry() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join(".mod.cache.json"),
        r#"{"app": {"libA": {"name": "libA", "version": "1.0.3", "branch": "main"}}}"#,
    );

    let err = WorkspaceLock::load(WorkspaceLockOptions::for_workspace(temp.path())).unwrap_err();
    assert!(err.to_string().contains("only one of version, branch or file_path"));
}

#[test]
fn lock_custom_install_dir_and_lock_name() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write(&ws.join("deps.lock.json"), LOCK);
    for (folder, name) in [
        ("libA@v1.0.3", "libA"),
        ("libB@feature-x", "libB"),
        ("libC@v0.4.0", "libC"),
    ] {
        write(
            &ws.join("vendor").join(folder).join("mod.toml"),
            &format!("[mod]\nname = \"{name}\"\n"),
        );
    }

    let options = WorkspaceLockOptions::builder()
        .with_workspace_path(ws)
        .with_lock_file_name("deps.lock.json")
        .with_install_dir("vendor")
        .build();
    let lock = WorkspaceLock::load(options).unwrap();
    assert!(!lock.incomplete());
    assert_eq!(lock.install_path(), ws.join("vendor"));
}

// =============================================================================
// Persistence and diffing
// =============================================================================

#[test]
fn lock_save_then_diff() {
    let temp = workspace();
    let ws = temp.path();
    let before_path = ws.join("before.json");
    fs::copy(ws.join(".mod.cache.json"), &before_path).unwrap();

    let mut lock = load(ws);
    // Saving drops the missing libC entry
    lock.save().unwrap();

    let reloaded = load(ws);
    assert!(!reloaded.incomplete());
    assert_eq!(reloaded.install_cache(), lock.install_cache());

    let diff = diff_lock_files(&before_path, &ws.join(".mod.cache.json")).unwrap();
    insta::assert_snapshot!(diff.to_string(), @"- libC@v0.4.0 (in libA@v1.0.3)");
}

#[test]
fn lock_diff_against_missing_file_lists_everything_added() {
    let temp = workspace();
    let ws = temp.path();

    let diff = diff_lock_files(&ws.join("nope.json"), &ws.join(".mod.cache.json")).unwrap();
    insta::assert_snapshot!(diff.to_string(), @r"
    + libA@v1.0.3 (in app)
    + libB@feature/x (in app)
    + libC@v0.4.0 (in libA@v1.0.3)
    ");
}

#[test]
fn lock_diff_rejects_malformed_file() {
    let temp = workspace();
    let bad = temp.path().join("bad.json");
    write(&bad, "{ not json");

    let err = diff_lock_files(&bad, &temp.path().join(".mod.cache.json")).unwrap_err();
    assert!(format!("{err:#}").contains("bad.json"));
}

#[test]
fn lock_save_empty_cache_removes_file() {
    let temp = workspace();
    let mut lock = load(temp.path());
    lock.set_install_cache(DependencyVersionMap::new());
    lock.save().unwrap();

    assert!(!temp.path().join(".mod.cache.json").exists());
    assert!(!lock.lock_file_exists());
}

// =============================================================================
// Tree rendering
// =============================================================================

#[test]
fn lock_tree_uses_workspace_mod_as_root() {
    let temp = workspace();
    install(temp.path(), "libC@v0.4.0", "libC");
    let lock = load(temp.path());

    let output = render_tree(&lock, &TreeArgs::default()).unwrap();
    insta::assert_snapshot!(output, @r"
    app
    ├── libA@v1.0.3
    │   └── libC@v0.4.0
    └── libB@feature/x#0123456
    ");
}

#[test]
fn lock_tree_of_missing_versions() {
    let temp = workspace();
    let lock = load(temp.path());

    let args = TreeArgs {
        root: Some("libA@v1.0.3".to_string()),
        missing: true,
    };
    let output = render_tree(&lock, &args).unwrap();
    insta::assert_snapshot!(output, @r"
    libA@v1.0.3
    └── libC@v0.4.0
    ");
}

#[test]
fn lock_tree_without_mod_definition_uses_top_level_parents() {
    let temp = workspace();
    fs::remove_file(temp.path().join("mod.toml")).unwrap();
    let lock = load(temp.path());

    let output = render_tree(&lock, &TreeArgs::default()).unwrap();
    assert!(output.starts_with("app\n"));
    assert!(!output.contains("libC"));
}
