//! CLI integration tests for chemdb admin commands.
//!
//! Each test uses an isolated temp directory for the database, so tests
//! can run in parallel.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use chemdb::store::{SqliteStore, Store};
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("chemdb").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }

    fn create_user(&self, username: &str, password: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "create-user",
                "--username",
                username,
                "--password",
                password,
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(self.data_dir().join("chemdb.db")).expect("failed to open store")
    }
}

#[test]
fn init_creates_database() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Database ready"));

    assert!(ctx.data_dir().join("chemdb.db").exists());
}

#[test]
fn init_is_idempotent() {
    let ctx = TestContext::new();

    ctx.init().success();
    ctx.create_user("curator", "hunter22").success();
    ctx.init().success();

    let users = ctx.store().list_users().expect("list users");
    assert_eq!(users.len(), 1);
}

#[test]
fn create_user_stores_hashed_password() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.create_user("curator", "hunter22")
        .success()
        .stdout(predicate::str::contains("Created user 'curator'"));

    let user = ctx
        .store()
        .get_user_by_username("curator")
        .expect("lookup user")
        .expect("user exists");
    assert_ne!(user.password_hash, "hunter22");
    assert!(user.password_hash.starts_with("$argon2"));
}

#[test]
fn create_user_rejects_duplicate() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.create_user("curator", "hunter22").success();

    ctx.create_user("curator", "other")
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn create_user_rejects_invalid_username() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.create_user("", "hunter22").failure();
    ctx.create_user("two words", "hunter22")
        .failure()
        .stderr(predicate::str::contains("whitespace"));

    assert!(ctx.store().list_users().expect("list users").is_empty());
}

#[test]
fn create_user_requires_password_when_non_interactive() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "create-user",
            "--username",
            "curator",
            "--data-dir",
            &ctx.data_dir_str(),
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--password is required"));
}

#[test]
fn create_user_rejects_empty_password() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.create_user("curator", "")
        .failure()
        .stderr(predicate::str::contains("Password cannot be empty"));
}

#[test]
fn create_user_before_init_fails() {
    let ctx = TestContext::new();

    ctx.create_user("curator", "hunter22")
        .failure()
        .stderr(predicate::str::contains("admin init"));

    assert!(!ctx.data_dir().join("chemdb.db").exists());
}

#[test]
fn list_and_delete_users() {
    let ctx = TestContext::new();
    ctx.init().success();
    ctx.create_user("curator", "hunter22").success();
    ctx.create_user("reviewer", "hunter33").success();

    ctx.cmd()
        .args(["admin", "list-users", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("curator").and(predicate::str::contains("reviewer")));

    ctx.cmd()
        .args([
            "admin",
            "delete-user",
            "--username",
            "reviewer",
            "--data-dir",
            &ctx.data_dir_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted user 'reviewer'"));

    let users = ctx.store().list_users().expect("list users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "curator");
}

#[test]
fn delete_unknown_user_fails() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.cmd()
        .args([
            "admin",
            "delete-user",
            "--username",
            "ghost",
            "--data-dir",
            &ctx.data_dir_str(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn serve_requires_initialized_database() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["serve", "--port", "0", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin init"));
}

#[test]
fn serve_rejects_unknown_config_keys() {
    let ctx = TestContext::new();
    ctx.init().success();

    let config_path = ctx.data_dir().join("chemdb.toml");
    std::fs::write(&config_path, "listen = \"0.0.0.0\"\n").expect("write config");

    ctx.cmd()
        .args([
            "serve",
            "--config",
            &config_path.to_string_lossy(),
            "--data-dir",
            &ctx.data_dir_str(),
        ])
        .assert()
        .failure();
}
