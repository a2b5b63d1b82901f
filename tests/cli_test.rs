//! CLI Tests
//!
//! `goods2xlsx`バイナリを実際に起動し、終了コードと出力を検証します。

use std::path::Path;
use std::process::{Command, Output};

const CATALOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<pma_xml_export version="1.0">
    <database name="gloowi">
        <table name="gloowi_goods">
            <column name="name">A-1</column>
            <column name="content">&lt;p&gt;Описание&lt;/p&gt;</column>
            <column name="price">100</column>
            <column name="price_retail">150</column>
            <column name="har_size">M</column>
        </table>
    </database>
</pma_xml_export>"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_goods2xlsx"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn test_no_arguments_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Usage: "));
    assert!(stdout.contains("<xmlFile>"));
    assert!(!dir.path().join("output_.xlsx").exists());
}

#[test]
fn test_extra_arguments_print_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["a.xml", "b.xml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Usage: "));
}

#[test]
fn test_successful_conversion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("goods.xml"), CATALOG).unwrap();
    std::fs::write(dir.path().join("output_old.xlsx"), b"stale").unwrap();

    let output = run(dir.path(), &["goods.xml"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("'output_old.xlsx' removed"));
    assert!(stdout.contains("'output_.xlsx' created"));
    assert!(stdout.contains("Database: 'gloowi'"));
    assert!(stdout.contains("1 records written, 0 skipped"));

    assert!(dir.path().join("output_.xlsx").exists());
    assert!(!dir.path().join("output_old.xlsx").exists());
}

#[test]
fn test_schema_failure_exits_with_error_but_keeps_workbook() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("other.xml"), "<export><rows/></export>").unwrap();

    let output = run(dir.path(), &["other.xml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Schema Error"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("'output_.xlsx' created"));
    assert!(dir.path().join("output_.xlsx").exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["absent.xml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O Error"));
}
