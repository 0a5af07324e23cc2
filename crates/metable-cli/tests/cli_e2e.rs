#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config: PathBuf,
    db: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("metable.toml");
        fs::write(&config, "").unwrap();
        let db = dir.path().join("meta.db");
        Self { dir, config, db }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("metable"));
        cmd.env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config)
            .arg("--db")
            .arg(&self.db);
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(output.status.success(), "{:?} failed: {:?}", args, output);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_set_get_and_list() {
    let env = Env::new();

    env.cmd()
        .args(["set", "post", "1", "author", "Stephen King"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"created\""));
    env.cmd()
        .args(["set", "post", "1", "year", "1986"])
        .assert()
        .success();

    assert_eq!(env.json(&["get", "post", "1", "author"]), json!("Stephen King"));
    assert_eq!(
        env.json(&["list", "post", "1"]),
        json!({"author": "Stephen King", "year": 1986})
    );
    assert_eq!(env.json(&["list", "post", "1", "--except", "year"]), json!({"author": "Stephen King"}));
    assert_eq!(env.json(&["get", "post", "2", "author"]), Value::Null);
}

#[test]
fn test_set_twice_updates_but_add_appends() {
    let env = Env::new();

    env.cmd().args(["set", "post", "1", "author", "A"]).assert().success();
    env.cmd()
        .args(["set", "post", "1", "author", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"updated\""));
    assert_eq!(env.json(&["count", "post", "1", "author"]), json!(1));

    env.cmd().args(["add", "post", "1", "tag", "horror"]).assert().success();
    env.cmd().args(["add", "post", "1", "tag", "horror"]).assert().success();
    assert_eq!(env.json(&["count", "post", "1", "tag"]), json!(2));
    assert_eq!(env.json(&["count", "post", "1"]), json!(3));
}

#[test]
fn test_null_deletes_and_delete_by_value() {
    let env = Env::new();

    env.cmd().args(["set", "post", "1", "author", "A"]).assert().success();
    env.cmd()
        .args(["set", "post", "1", "author", "null"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"deleted\""));
    assert_eq!(env.json(&["count", "post", "1"]), json!(0));

    env.cmd().args(["add", "post", "1", "tag", "a"]).assert().success();
    env.cmd().args(["add", "post", "1", "tag", "b"]).assert().success();
    assert_eq!(
        env.json(&["delete", "post", "1", "tag", "--value", "b"]),
        json!({"deleted": true})
    );
    assert_eq!(env.json(&["count", "post", "1", "tag"]), json!(1));
    assert_eq!(env.json(&["delete", "post", "1", "missing"]), json!({"deleted": false}));
}

#[test]
fn test_search_by_json_path() {
    let env = Env::new();

    env.cmd()
        .args(["set", "book", "1", "publisher", r#"{"cities":["Ankara","Istanbul"]}"#])
        .assert()
        .success();
    env.cmd()
        .args(["set", "book", "2", "publisher", r#"{"cities":["Izmir"]}"#])
        .assert()
        .success();

    let found = env.json(&[
        "search", "--key", "publisher", "--type", "book", "--path", "cities", "--value", "Ankara",
    ]);
    assert_eq!(found, json!([{"owner_type": "book", "owner_id": "1"}]));

    let like = env.json(&["search", "--key", "publisher", "--value", "izmir"]);
    assert_eq!(like, json!([{"owner_type": "book", "owner_id": "2"}]));
}

#[test]
fn test_purge_removes_everything_for_owner() {
    let env = Env::new();

    env.cmd().args(["set", "post", "1", "author", "A"]).assert().success();
    env.cmd().args(["add", "post", "1", "tag", "x"]).assert().success();
    env.cmd().args(["set", "post", "2", "author", "B"]).assert().success();

    assert_eq!(env.json(&["purge", "post", "1"]), json!({"removed": 2}));
    assert_eq!(env.json(&["count", "post", "1"]), json!(0));
    assert_eq!(env.json(&["count", "post", "2"]), json!(1));
}

#[test]
fn test_export_then_import_onto_another_owner() {
    let env = Env::new();

    env.cmd().args(["set", "post", "1", "author", "Stephen King"]).assert().success();
    let output = env.cmd().args(["export", "post", "1"]).output().unwrap();
    assert!(output.status.success());
    let snapshot = env.dir.path().join("snapshot.json");
    fs::write(&snapshot, &output.stdout).unwrap();

    let imported = env.json(&[
        "import",
        snapshot.to_str().unwrap(),
        "--into",
        "post",
        "2",
    ]);
    assert_eq!(imported, json!({"imported": 1}));
    assert_eq!(env.json(&["get", "post", "2", "author"]), json!("Stephen King"));
}

#[test]
fn test_missing_config_file_fails() {
    let env = Env::new();

    Command::new(cargo_bin("metable"))
        .arg("--config")
        .arg(env.dir.path().join("nope.toml"))
        .args(["count", "post", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_unusable_key_is_an_error() {
    let env = Env::new();

    env.cmd()
        .args(["set", "post", "1", "!!!", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
