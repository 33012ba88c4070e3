use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kakeibo(ledger: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kakeibo").unwrap();
    cmd.env_remove("KAKEIBO_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--file")
        .arg(ledger);
    cmd
}

#[test]
fn test_add_then_balance_and_list() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");

    kakeibo(&ledger)
        .args(["add", "2025-10-01", "食費", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 records."));
    kakeibo(&ledger)
        .args(["add", "2025-10-05", "給与", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 records."));

    kakeibo(&ledger)
        .arg("balance")
        .assert()
        .success()
        .stdout("4000\n");
    kakeibo(&ledger)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("date,category,amount"))
        .stdout(predicate::str::contains("2025-10-05,給与,5000"));
}

#[test]
fn test_balance_without_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");

    kakeibo(&ledger)
        .arg("balance")
        .assert()
        .success()
        .stdout("No records yet.\n");
    assert!(!ledger.exists());
}

#[test]
fn test_add_rejects_malformed_amount() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");

    kakeibo(&ledger)
        .args(["add", "2025-10-01", "食費", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not an integer"));
    assert!(!ledger.exists());
}

#[test]
fn test_malformed_stored_amount_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");
    fs::write(
        &ledger,
        "date,category,amount\n2025-10-01,食費,abc\n2025-10-05,給与,5000\n",
    )
    .unwrap();

    kakeibo(&ledger)
        .arg("balance")
        .assert()
        .success()
        .stdout("5000\n")
        .stderr(predicate::str::contains("left out"));

    kakeibo(&ledger)
        .env("RUST_LOG", "warn")
        .arg("balance")
        .assert()
        .success()
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains(
            "Skipping 食費 entry dated 2025-10-01: Amount \"abc\" is not an integer",
        ));
    kakeibo(&ledger)
        .env("RUST_LOG", "warn")
        .arg("chart")
        .assert()
        .success()
        .stdout(predicate::str::contains("5000 給与"))
        .stdout(predicate::str::contains("食費").not())
        .stderr(predicate::str::contains("Amount \"abc\" is not an integer"));
}

#[test]
fn test_balance_beyond_i64_range() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");
    fs::write(
        &ledger,
        "date,category,amount\n\
         2025-12-01,給与,9223372036854775807\n\
         2025-12-02,給与,1\n",
    )
    .unwrap();

    kakeibo(&ledger)
        .arg("balance")
        .assert()
        .success()
        .stdout("9223372036854775808\n");
}

#[test]
fn test_shell_session_saves_on_quit() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");

    kakeibo(&ledger)
        .write_stdin("1\n2025-10-01\n食費\n1000\n1\n2025-10-05\n給与\n5000\n2\n3\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance: 4000"))
        .stdout(predicate::str::contains("1000 食費"))
        .stdout(predicate::str::contains("Saved 2 records."));

    let text = fs::read_to_string(&ledger).unwrap();
    assert!(text.starts_with("date,category,amount"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_dry_run_never_writes() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");

    kakeibo(&ledger)
        .args(["--dry-run", "add", "2025-10-01", "食費", "1000"])
        .assert()
        .success();
    assert!(!ledger.exists());
}

#[test]
fn test_configured_encoding_and_income() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = temp_dir.path().join("kakeibo.csv");
    let config = temp_dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"encoding": "cp932", "income_categories": ["賞与"]}"#,
    )
    .unwrap();

    kakeibo(&ledger)
        .arg("--config")
        .arg(&config)
        .args(["add", "2025-12-10", "賞与", "300000"])
        .assert()
        .success();
    assert!(fs::read_to_string(&ledger).is_err());

    kakeibo(&ledger)
        .arg("--config")
        .arg(&config)
        .arg("balance")
        .assert()
        .success()
        .stdout("300000\n");
    kakeibo(&ledger)
        .args(["--encoding", "cp932", "balance"])
        .assert()
        .success()
        .stdout("-300000\n");
    kakeibo(&ledger)
        .arg("balance")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid UTF-8"));
}
