//! CLI integration tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

/// Writes the fixture vocabulary to a temp file and returns the path.
fn vocab_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("vocab.json");
    fs::write(&path, cq_vocab::fixtures::vocab_json().to_string()).unwrap();
    path
}

#[test]
fn parse_prints_the_flattened_query() {
    Command::cargo_bin("cq")
        .unwrap()
        .args(["parse", "genre:(poetry or prose)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Or"))
        .stdout(predicate::str::contains("poetry"));
}

#[test]
fn parse_rejects_bad_syntax() {
    Command::cargo_bin("cq")
        .unwrap()
        .args(["parse", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parenthesis"));
}

#[test]
fn parse_with_vocab_prints_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = vocab_file(&dir);

    Command::cargo_bin("cq")
        .unwrap()
        .args(["parse", "author:Bergman"])
        .arg("--vocab")
        .arg(&vocab)
        .assert()
        .success()
        .stdout(predicate::str::contains("contribution"))
        .stdout(predicate::str::contains("query string:"));
}

#[test]
fn compile_emits_the_request_json() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = vocab_file(&dir);

    Command::cargo_bin("cq")
        .unwrap()
        .args(["compile", "author:Bergman and (genre:poetry or genre:prose)"])
        .arg("--vocab")
        .arg(&vocab)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"track_total_hits\": true"))
        .stdout(predicate::str::contains("contribution.agent"));
}

#[test]
fn compile_rejects_unknown_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = vocab_file(&dir);

    Command::cargo_bin("cq")
        .unwrap()
        .args(["compile", "nosuch:thing"])
        .arg("--vocab")
        .arg(&vocab)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nosuch"));
}
