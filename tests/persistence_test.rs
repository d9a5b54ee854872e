#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: one charge
    let orders1 = dir.path().join("first.csv");
    common::write_orders(
        &orders1,
        &[["1", "Widget", "1999", "", "", "", "", "pm_card_visa", ""]],
    )
    .unwrap();

    let mut cmd1 = Command::new(cargo_bin!("cashier-charge"));
    cmd1.arg(&orders1).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,1,Widget,succeeded"));

    // 2. Second run against the same database continues the id sequence
    let orders2 = dir.path().join("second.csv");
    common::write_orders(
        &orders2,
        &[["1", "Gadget", "500", "", "", "", "", "pm_card_visa", ""]],
    )
    .unwrap();

    let mut cmd2 = Command::new(cargo_bin!("cashier-charge"));
    cmd2.arg(&orders2).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout2.contains("1,1,Widget,succeeded"));
    assert!(stdout2.contains("2,1,Gadget,succeeded"));
}
