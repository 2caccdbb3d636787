mod common;

use assert_cmd::Command;
use common::{chain_table, write_table};
use std::fs;

#[test]
fn cli_no_arguments_reads_data_csv_writes_result_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("data.csv"), &chain_table(500, 42));

    Command::cargo_bin("lingam")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .success();

    let text = fs::read_to_string(dir.path().join("result.csv")).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.split(',').count() == 3));
}

#[test]
fn cli_parse_error_exits_nonzero_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "1,2,abc\n4,5,6\n").unwrap();

    let output = Command::cargo_bin("lingam")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("load stage failed"), "stderr: {}", stderr);
    assert!(!dir.path().join("result.csv").exists());
}

#[test]
fn cli_unwritable_output_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("obs.csv"), &chain_table(200, 3));

    Command::cargo_bin("lingam")
        .unwrap()
        .current_dir(dir.path())
        .args(["-i", "obs.csv", "-o", "nowhere/result.csv", "-q"])
        .assert()
        .failure();
}

#[test]
fn cli_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("obs.csv"), &chain_table(500, 8));
    fs::write(
        dir.path().join("lingam.json"),
        r#"{"input": "obs.csv", "output": "from-config.csv"}"#,
    )
    .unwrap();

    Command::cargo_bin("lingam")
        .unwrap()
        .current_dir(dir.path())
        .args(["-c", "lingam.json", "-o", "from-flag.csv", "--order-out", "order.csv"])
        .assert()
        .success();

    assert!(dir.path().join("from-flag.csv").exists());
    assert!(!dir.path().join("from-config.csv").exists());
    assert_eq!(fs::read_to_string(dir.path().join("order.csv")).unwrap(), "0,1,2\n");
}

#[test]
fn cli_rejects_unknown_measure() {
    Command::cargo_bin("lingam")
        .unwrap()
        .args(["-m", "ica"])
        .assert()
        .failure();
}
