use crate::commands::helpers::{entries_from_json, read_json, rows_from_json};
use overlap_common::models::Cell;
use overlap_error::ErrorCode;
use serde_json::json;
use std::io::Write;

#[test]
fn test_read_json_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_json(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code, ErrorCode::Io);
    assert!(err.hint.is_some());
}

#[test]
fn test_read_json_malformed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[1, 2").unwrap();
    let err = read_json(file.path()).unwrap_err();
    assert_eq!(err.code, ErrorCode::SerializationFailed);
}

#[test]
fn test_rows_from_json() {
    let table = rows_from_json(json!([["Tenure", "A", null, 50], null, []])).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.rows[0],
        vec![Cell::text("Tenure"), Cell::text("A"), Cell::Missing, Cell::Int(50)]
    );
    assert!(table.rows[1].is_empty());
}

#[test]
fn test_rows_from_json_rejects_bad_shapes() {
    let err = rows_from_json(json!({"rows": []})).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInputShape);

    let err = rows_from_json(json!([["ok"], "not a row"])).unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedRow);
}

#[test]
fn test_entries_from_json_single_or_array() {
    let one = json!({"table_summary": {"feature_name": "A", "table": "WHSE_X.A"}});
    assert_eq!(entries_from_json(one.clone()).unwrap().len(), 1);
    assert_eq!(entries_from_json(json!([one.clone(), one])).unwrap().len(), 2);

    let err = entries_from_json(json!(7)).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInputShape);
}
