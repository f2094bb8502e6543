//! Integration tests for the PassVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Interactive prompts are avoided by supplying the master password via
//! `PASSVAULT_PASSWORD` and secret values inline or on piped stdin.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "correct-horse-battery";

/// Helper: get a Command pointing at the passvault binary.
fn passvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("passvault").expect("binary should exist");
    cmd.env_remove("PASSVAULT_DIR").env_remove("PASSVAULT_PASSWORD");
    cmd
}

/// Helper: a command bound to the vault under `dir`, with the master
/// password in the environment.
fn in_vault(dir: &TempDir) -> Command {
    let mut cmd = passvault();
    cmd.arg("--vault-dir")
        .arg(dir.path())
        .env("PASSVAULT_PASSWORD", PASSWORD);
    cmd
}

/// Helper: a fresh, initialized vault with fast KDF settings and no git.
fn init_vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("passvault.toml")
        .write_str(
            "argon2_memory_kib = 8192\n\
             argon2_iterations = 1\n\
             argon2_parallelism = 1\n\
             auto_commit = false\n\
             git_program = \"/nonexistent/bin/git\"\n",
        )
        .unwrap();

    in_vault(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));
    dir
}

#[test]
fn help_flag_shows_usage() {
    passvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password and file vault"))
        .stdout(predicate::str::contains("insert"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("integrity"));
}

#[test]
fn version_subcommand_prints_version() {
    passvault()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("passvault "));
}

#[test]
fn generate_prints_password_of_requested_length() {
    let assert = passvault().args(["generate", "32"]).assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out.trim_end().chars().count(), 32);
}

#[test]
fn init_creates_vault_files() {
    let dir = init_vault();
    dir.child("config").assert(predicate::path::is_file());
    dir.child("sites.vault").assert(predicate::path::is_file());
    dir.child("files").assert(predicate::path::is_dir());
    dir.child(".gitignore")
        .assert(predicate::str::contains("attacked"));
}

#[test]
fn init_twice_fails() {
    let dir = init_vault();
    in_vault(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_on_missing_vault_fail() {
    let dir = TempDir::new().unwrap();
    in_vault(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No vault found"));
}

#[test]
fn insert_then_show_prints_password() {
    let dir = init_vault();

    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 'email/gmail'"));

    in_vault(&dir)
        .args(["show", "email/gmail"])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn insert_reads_piped_value() {
    let dir = init_vault();

    in_vault(&dir)
        .args(["insert", "bank/chase"])
        .write_stdin("s3cret-from-pipe\n")
        .assert()
        .success();

    in_vault(&dir)
        .args(["show", "bank/chase"])
        .assert()
        .success()
        .stdout("s3cret-from-pipe\n");
}

#[test]
fn duplicate_insert_without_force_fails() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    in_vault(&dir)
        .args(["insert", "email/gmail", "other"])
        .assert()
        .failure();

    in_vault(&dir)
        .args(["insert", "email/gmail", "other", "--force"])
        .assert()
        .success();
    in_vault(&dir)
        .args(["show", "email/gmail"])
        .assert()
        .stdout("other\n");
}

#[test]
fn find_rename_and_remove() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    in_vault(&dir)
        .args(["ls", "mail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("email/gmail"));

    in_vault(&dir)
        .args(["rename", "email/gmail", "mail/google"])
        .assert()
        .success();
    in_vault(&dir)
        .args(["show", "mail/google"])
        .assert()
        .stdout("hunter2\n");

    in_vault(&dir)
        .args(["remove", "mail/google", "--force"])
        .assert()
        .success();
    in_vault(&dir)
        .args(["show", "mail/google"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn file_entry_round_trip() {
    let dir = init_vault();
    let src = TempDir::new().unwrap();
    src.child("id.txt").write_str("passport 1234").unwrap();

    in_vault(&dir)
        .arg("insert-file")
        .arg("docs/id.txt")
        .arg(src.child("id.txt").path())
        .assert()
        .success();

    let out = src.child("restored.txt");
    in_vault(&dir)
        .args(["show", "docs/id.txt", "--output"])
        .arg(out.path())
        .assert()
        .success();
    out.assert("passport 1234");

    in_vault(&dir)
        .args(["remove-file", "docs/id.txt", "--force"])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_dir(dir.child("files").path()).unwrap().count(),
        0
    );
}

#[test]
fn wrong_password_is_rejected() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    passvault()
        .arg("--vault-dir")
        .arg(dir.path())
        .env("PASSVAULT_PASSWORD", "not-the-password")
        .args(["show", "email/gmail"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn tampered_store_fails_integrity_check() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    let store = dir.child("sites.vault");
    let mut bytes = std::fs::read(store.path()).unwrap();
    let idx = bytes.len() - 40;
    bytes[idx] ^= 0x20;
    std::fs::write(store.path(), bytes).unwrap();

    in_vault(&dir).arg("integrity").assert().failure();
    dir.child("attacked").assert(predicate::path::exists());

    in_vault(&dir)
        .args(["insert", "bank", "x"])
        .assert()
        .failure();
}

#[test]
fn integrity_reset_redigests_and_clears_flag() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    let store = dir.child("sites.vault");
    let mut bytes = std::fs::read(store.path()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(store.path(), bytes).unwrap();
    in_vault(&dir).arg("integrity").assert().failure();

    in_vault(&dir)
        .args(["integrity", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("store re-digested with 1 entries"));
    dir.child("attacked").assert(predicate::path::missing());

    in_vault(&dir)
        .args(["show", "email/gmail"])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn integrity_passes_on_clean_vault() {
    let dir = init_vault();
    in_vault(&dir)
        .arg("integrity")
        .assert()
        .success()
        .stdout(predicate::str::contains("verified"));
}

#[test]
fn pincode_unlocks_once() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    dir.child("unlock.toml")
        .write_str(&format!("pincode = \"{PASSWORD}\"\n"))
        .unwrap();

    passvault()
        .arg("--vault-dir")
        .arg(dir.path())
        .env("PASSVAULT_PASSWORD", "not-the-password")
        .args(["show", "email/gmail"])
        .assert()
        .success()
        .stdout("hunter2\n");

    dir.child("unlock.toml")
        .assert(predicate::str::contains(PASSWORD).not());

    passvault()
        .arg("--vault-dir")
        .arg(dir.path())
        .env("PASSVAULT_PASSWORD", "not-the-password")
        .args(["show", "email/gmail"])
        .assert()
        .failure();
}

#[test]
fn erase_pincode_masks_pending_code() {
    let dir = init_vault();
    in_vault(&dir)
        .args(["insert", "email/gmail", "hunter2"])
        .assert()
        .success();

    dir.child("unlock.toml")
        .write_str(&format!("pincode = \"{PASSWORD}\"\n"))
        .unwrap();

    in_vault(&dir)
        .arg("erase-pincode")
        .assert()
        .success()
        .stdout(predicate::str::contains("erased"));
    dir.child("unlock.toml")
        .assert(predicate::str::contains(PASSWORD).not());

    passvault()
        .arg("--vault-dir")
        .arg(dir.path())
        .env("PASSVAULT_PASSWORD", "not-the-password")
        .args(["show", "email/gmail"])
        .assert()
        .failure();

    in_vault(&dir)
        .arg("erase-pincode")
        .assert()
        .success()
        .stdout(predicate::str::contains("No one-time code"));
}

#[test]
fn completions_generate_for_bash() {
    passvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passvault"));
}
