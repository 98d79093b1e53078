//! CLI behavior over a directory-backed remote.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn driftsync() -> Command {
    Command::cargo_bin("driftsync").expect("binary built")
}

#[test]
fn test_sync_transfers_into_remote_directory() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::create_dir_all(local.path().join("docs")).expect("create docs");
    fs::write(local.path().join("docs/hello.txt"), b"hello").expect("write file");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 1 uploaded"));

    assert_eq!(
        fs::read(remote.path().join("docs/hello.txt")).expect("read remote copy"),
        b"hello"
    );
}

#[test]
fn test_second_sync_has_nothing_to_do() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("a.txt"), b"a").expect("write file");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success();

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to sync."));
}

#[test]
fn test_dry_run_changes_nothing() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("a.txt"), b"a").expect("write file");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("UPLOAD    a.txt"))
        .stdout(predicate::str::contains("Dry-run mode: no changes were made."));

    assert!(!remote.path().join("a.txt").exists());
    assert!(fs::read_dir(local.path())
        .expect("read local dir")
        .all(|e| e.expect("entry").file_name() == "a.txt"));
}

#[test]
fn test_exclude_pattern_is_honored() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("keep.txt"), b"k").expect("write keep");
    fs::write(local.path().join("scratch.tmp"), b"s").expect("write scratch");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .arg("--exclude")
        .arg("*.tmp")
        .assert()
        .success();

    assert!(remote.path().join("keep.txt").exists());
    assert!(!remote.path().join("scratch.tmp").exists());
}

#[test]
fn test_status_lists_pending_work() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("new.txt"), b"n").expect("write file");

    driftsync()
        .arg("status")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending upload (1):"))
        .stdout(predicate::str::contains("new.txt"));

    // Status never transfers.
    assert!(!remote.path().join("new.txt").exists());
}

#[test]
fn test_status_on_synced_trees() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("a.txt"), b"a").expect("write file");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success();

    driftsync()
        .arg("status")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything is in sync."));
}

#[test]
fn test_status_without_remote_checks_prior_state() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("a.txt"), b"a").expect("write file");

    // Before any sync there is no state to compare against.
    driftsync()
        .arg("status")
        .arg(local.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("never synced"))
        .stdout(predicate::str::contains("a.txt"));

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success();
    fs::write(local.path().join("b.txt"), b"b").expect("write new file");

    driftsync()
        .arg("status")
        .arg(local.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("New since last sync (1):"))
        .stdout(predicate::str::contains("b.txt"));
}

#[test]
fn test_missing_local_directory_is_fatal() {
    let remote = TempDir::new().expect("remote dir");

    driftsync()
        .arg("sync")
        .arg("/definitely/not/a/real/path")
        .arg(remote.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_delete_flag_propagates_local_deletion() {
    let local = TempDir::new().expect("local dir");
    let remote = TempDir::new().expect("remote dir");
    fs::write(local.path().join("a.txt"), b"a").expect("write a");
    fs::write(local.path().join("b.txt"), b"b").expect("write b");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .assert()
        .success();
    fs::remove_file(local.path().join("b.txt")).expect("delete local copy");

    driftsync()
        .arg("sync")
        .arg(local.path())
        .arg(remote.path())
        .arg("--delete")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 deleted"));

    assert!(remote.path().join("a.txt").exists());
    assert!(!remote.path().join("b.txt").exists());
}
