//! CLI commands that only touch local preferences.

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn base_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wikisearch"));
    cmd.env("NO_COLOR", "1")
        .env("COLORFGBG", "0;15")
        .env_remove("WIKISEARCH_DATA_DIR")
        .env_remove("WIKISEARCH_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn seed_history(dir: &Path, terms: &[&str]) {
    let entries: Vec<Value> = terms
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "term": t, "timestamp": 1_700_000_000_000i64 - i as i64 }))
        .collect();
    let prefs = json!({ "searchHistory": serde_json::to_string(&entries).unwrap() });
    fs::write(dir.join("prefs.json"), prefs.to_string()).unwrap();
}

fn saved_prefs(dir: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(dir.join("prefs.json")).unwrap()).unwrap()
}

#[test]
fn theme_defaults_to_system_and_toggle_persists() {
    let tmp = TempDir::new().unwrap();

    base_cmd(tmp.path())
        .arg("theme")
        .assert()
        .success()
        .stdout(contains("light").and(contains("system default")));

    base_cmd(tmp.path())
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(contains("dark").and(contains("saved")));
    assert_eq!(saved_prefs(tmp.path())["darkMode"], "true");

    base_cmd(tmp.path())
        .args(["theme", "light"])
        .assert()
        .success()
        .stdout(contains("light (saved)"));
    assert_eq!(saved_prefs(tmp.path())["darkMode"], "false");
}

#[test]
fn data_dir_can_come_from_env() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wikisearch"));
    cmd.env("NO_COLOR", "1")
        .env("WIKISEARCH_DATA_DIR", tmp.path())
        .args(["theme", "dark"])
        .assert()
        .success();
    assert_eq!(saved_prefs(tmp.path())["darkMode"], "true");
}

#[test]
fn history_lists_newest_first() {
    let tmp = TempDir::new().unwrap();
    seed_history(tmp.path(), &["Nepal", "India"]);

    let out = base_cmd(tmp.path())
        .arg("history")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let nepal = out.find("Nepal").expect("Nepal listed");
    let india = out.find("India").expect("India listed");
    assert!(nepal < india);
}

#[test]
fn history_json_is_parseable() {
    let tmp = TempDir::new().unwrap();
    seed_history(tmp.path(), &["India"]);

    let out = base_cmd(tmp.path())
        .args(["history", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed[0]["term"], "India");
    assert_eq!(parsed[0]["timestamp"], 1_700_000_000_000i64);
}

#[test]
fn history_remove_and_clear() {
    let tmp = TempDir::new().unwrap();
    seed_history(tmp.path(), &["New Delhi", "India"]);

    base_cmd(tmp.path())
        .args(["history", "remove", "New", "Delhi"])
        .assert()
        .success()
        .stdout(contains("Removed \"New Delhi\""));

    base_cmd(tmp.path())
        .args(["history", "remove", "Tibet"])
        .assert()
        .success()
        .stdout(contains("not in history"));

    base_cmd(tmp.path())
        .args(["history", "clear"])
        .assert()
        .success();

    base_cmd(tmp.path())
        .arg("history")
        .assert()
        .success()
        .stdout(contains("No search history yet."));
}

#[test]
fn corrupt_history_reads_as_empty() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prefs.json"),
        r#"{"searchHistory":"not json"}"#,
    )
    .unwrap();

    base_cmd(tmp.path())
        .arg("history")
        .assert()
        .success()
        .stdout(contains("No search history yet."));
}

#[test]
fn blank_search_term_is_rejected() {
    let tmp = TempDir::new().unwrap();
    base_cmd(tmp.path())
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(contains("search term is empty"));
}

#[test]
fn completions_mention_binary() {
    let tmp = TempDir::new().unwrap();
    base_cmd(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("wikisearch"));
}
