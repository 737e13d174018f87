// CLI integration tests for the json2md binary.
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_json2md");
    Command::new(exe)
}

fn fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn stderr_json(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().expect("stderr line");
    serde_json::from_str(line).expect("stderr json")
}

#[test]
fn renders_table_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = fixture(
        &temp,
        "people.json",
        r#"[{"name":"John","age":30},{"name":"ssss","age":10}]"#,
    );

    let output = cmd()
        .args(["-f", path.to_str().unwrap()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    // println! adds one newline after the table's own final newline.
    assert_eq!(stdout, "name|age\n---|---\nJohn|30|\nssss|10|\n\n");
}

#[test]
fn long_flag_selects_the_same_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = fixture(&temp, "one.json", r#"[{"a":1,"b":2}]"#);

    let output = cmd()
        .args(["--file", path.to_str().unwrap()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "a|b\n---|---\n1|2|\n\n");
}

#[test]
fn reads_stdin_when_no_file_is_given() {
    let mut child = cmd()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"[{"a":1},{"a":2,"b":3}]"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "a\n---\n1|\n2|3|\n\n");
}

#[test]
fn missing_file_exits_with_io_code_and_json_error() {
    let output = cmd()
        .args(["-f", "/nonexistent/input.json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());

    let err = stderr_json(&output.stderr);
    let obj = err.get("error").and_then(|v| v.as_object()).expect("error");
    assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("Io"));
    assert!(
        obj.get("path")
            .and_then(|v| v.as_str())
            .expect("path")
            .ends_with("input.json")
    );
}

#[test]
fn top_level_object_exits_with_structure_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = fixture(&temp, "object.json", r#"{"key":"value"}"#);

    let output = cmd()
        .args(["-f", path.to_str().unwrap()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(5));

    let err = stderr_json(&output.stderr);
    let obj = err.get("error").and_then(|v| v.as_object()).expect("error");
    assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("Structure"));
    assert!(obj.get("hint").is_some());
}

#[test]
fn malformed_json_exits_with_token_read_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = fixture(&temp, "bad.json", r#"[{"name": "John", age: 30}]"#);

    let output = cmd()
        .args(["-f", path.to_str().unwrap()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(4));

    let err = stderr_json(&output.stderr);
    let obj = err.get("error").and_then(|v| v.as_object()).expect("error");
    assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("TokenRead"));
    assert!(obj.get("offset").and_then(|v| v.as_u64()).is_some());
}

#[test]
fn empty_array_exits_with_empty_table_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = fixture(&temp, "empty.json", "[]");

    let output = cmd()
        .args(["-f", path.to_str().unwrap()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(7));
    assert!(output.stdout.is_empty());

    let err = stderr_json(&output.stderr);
    let obj = err.get("error").and_then(|v| v.as_object()).expect("error");
    assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("EmptyTable"));
}
