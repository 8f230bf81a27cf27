//! CLI Integration Tests
//!
//! Tests the stockledger binary directly using assert_cmd.
//!
//! # Coverage Exclusion
//! These tests are skipped during coverage runs; run without coverage for
//! full testing.

#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_sheet(dir: &TempDir, name: &str, rows: &[&[&str]]) -> PathBuf {
    let path = dir.path().join(name);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

fn valid_sheet(dir: &TempDir) -> PathBuf {
    create_sheet(
        dir,
        "stock.xlsx",
        &[
            &["ACME TRADERS"],
            &["S NO", "BANK", "LOT NO", "DATE", "MARK", "LORRY", "PRODUCT"],
            &["1", "SBI", "LOT1", "01-01-2024", "", "", "Wheat", "50", "10", "500"],
            &["PARTY TOTAL", "", "", "", "", "", "", "", "10", "500"],
            &["GLOBEX"],
            &["1", "HDFC", "LOT7", "", "", "", "Sugar", "", "2", "80"],
        ],
    )
}

fn orphan_sheet(dir: &TempDir) -> PathBuf {
    create_sheet(
        dir,
        "orphan.xlsx",
        &[&["1", "SBI", "LOT1", "", "", "", "Wheat"]],
    )
}

fn stockledger() -> Command {
    Command::cargo_bin("stockledger").unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    stockledger()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stockledger"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    stockledger()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stockledger"));
}

#[test]
fn test_ingest_help_describes_layout() {
    stockledger()
        .args(["ingest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PARTY TOTAL"))
        .stdout(predicate::str::contains("day-first"));
}

#[test]
fn test_validate_requires_files() {
    stockledger().arg("validate").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// INGEST TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ingest_prints_party_summary() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);

    stockledger()
        .arg("ingest")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Traders"))
        .stdout(predicate::str::contains("Globex"))
        .stdout(predicate::str::contains("1 lots"));
}

#[test]
fn test_ingest_writes_json_output() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);
    let output = dir.path().join("records.json");

    stockledger()
        .arg("ingest")
        .arg(&sheet)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["party_name"], "Acme Traders");
    assert_eq!(records[0]["date"], "2024-01-01");
    assert_eq!(records[1]["quantity"], 2);
}

#[test]
fn test_ingest_missing_party_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = orphan_sheet(&dir);

    stockledger()
        .arg("ingest")
        .arg(&sheet)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingParty"));
}

#[test]
fn test_ingest_nonexistent_file_fails() {
    stockledger()
        .args(["ingest", "/nonexistent/stock.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Load"));
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_validate_valid_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);

    stockledger()
        .arg("validate")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 records"))
        .stdout(predicate::str::contains("All stock sheets are valid"));
}

#[test]
fn test_validate_batch_reports_each_failure() {
    let dir = TempDir::new().unwrap();
    let good = valid_sheet(&dir);
    let bad = orphan_sheet(&dir);

    stockledger()
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing party name before row 1"))
        .stderr(predicate::str::contains("1 of 2 file(s) failed validation"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_creates_workbook() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);
    let output = dir.path().join("clean.xlsx");

    stockledger()
        .arg("export")
        .arg(&sheet)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));

    assert!(output.exists());
    assert_eq!(
        stockledger::ingest_path(&output).unwrap(),
        stockledger::ingest_path(&sheet).unwrap()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// UPLOAD TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_upload_reports_stored_and_dropped() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);
    let accounts = dir.path().join("accounts.yaml");
    fs::write(
        &accounts,
        "accounts:\n  - party_id: P001\n    party_name: Acme Traders\n",
    )
    .unwrap();

    stockledger()
        .arg("upload")
        .arg(&sheet)
        .arg("--accounts")
        .arg(&accounts)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored:  1"))
        .stdout(predicate::str::contains("Dropped: 1"));
}

#[test]
fn test_upload_accounts_from_env() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);
    let accounts = dir.path().join("accounts.yaml");
    fs::write(
        &accounts,
        "accounts:\n  - party_id: P001\n    party_name: Acme Traders\n  - party_id: P002\n    party_name: Globex\n",
    )
    .unwrap();

    stockledger()
        .arg("upload")
        .arg(&sheet)
        .env("STOCKLEDGER_ACCOUNTS", &accounts)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored:  2"))
        .stdout(predicate::str::contains("Dropped: 0"));
}

#[test]
fn test_upload_duplicate_account_ids_fail() {
    let dir = TempDir::new().unwrap();
    let sheet = valid_sheet(&dir);
    let accounts = dir.path().join("accounts.yaml");
    fs::write(
        &accounts,
        "accounts:\n  - party_id: P001\n    party_name: Acme Traders\n  - party_id: P001\n    party_name: Globex\n",
    )
    .unwrap();

    stockledger()
        .arg("upload")
        .arg(&sheet)
        .arg("--accounts")
        .arg(&accounts)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config"));
}
