use std::process::{Command, Output};

use serde_json::{json, Value};

fn calcf(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_calcf"))
        .args(args)
        .output()
        .expect("run calcf")
}

fn stdout_json(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("calcf prints JSON")
}

#[test]
fn test_eval_prints_number() {
    let out = calcf(&["eval", "Revenue - Cost", "--row", r#"{"Revenue":100,"Cost":40}"#]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out), json!(60.0));
}

#[test]
fn test_eval_prints_null_for_failed_formula() {
    let out = calcf(&["eval", "Revenue / Cost", "--row", r#"{"Revenue":100,"Cost":0}"#]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out), Value::Null);

    let out = calcf(&["eval", "Amount + 1; DROP TABLE", "--row", r#"{"Amount":5}"#]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out), Value::Null);
}

#[test]
fn test_eval_rejects_bad_row_json() {
    let out = calcf(&["eval", "A", "--row", "{not json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_validate_prints_verdict() {
    let out = calcf(&["validate", "A + B", "--field", "A", "--field", "B"]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out), json!({"valid": true}));

    let out = calcf(&["validate", "A + C", "--field", "A", "--strict"]);
    assert_eq!(stdout_json(&out), json!({"valid": false, "error": "Unknown fields: C"}));
}

#[test]
fn test_sheet_computes_rows() {
    let path = std::env::temp_dir().join(format!("calcf-sheet-{}.json", std::process::id()));
    let sheet = json!({
        "id": "s1",
        "columns": [{"field": "Qty"}, {"field": "Price"}],
        "calculated_columns": [{"field": "Total", "formula": "Qty * Price"}],
        "rows": [{"Qty": 3, "Price": "2.5"}]
    });
    std::fs::write(&path, sheet.to_string()).unwrap();

    let out = calcf(&["sheet", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();

    assert!(out.status.success());
    assert_eq!(stdout_json(&out)[0]["calculated"]["Total"], json!(7.5));
}

#[test]
fn test_missing_sheet_file_exits_with_error() {
    let out = calcf(&["sheet", "/nonexistent/calcf-sheet.json"]);
    assert_eq!(out.status.code(), Some(1));
}
