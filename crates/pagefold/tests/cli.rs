// ABOUTME: Integration tests for the pagefold CLI binary.
// ABOUTME: Tests pipeline application, splitting, stdin input, JSON and file output, and failures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pagefold_cmd() -> Command {
    Command::cargo_bin("pagefold").unwrap()
}

#[test]
fn apply_pipeline_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    let pipeline_path = temp_dir.path().join("pipeline.json");

    fs::write(&html_path, r#"<div class="highlight">let x = 1;</div>"#).unwrap();
    fs::write(
        &pipeline_path,
        r#"{"steps": [
            {"op": "retag", "selector": "div.highlight", "tag": "pre"},
            {"op": "remove_class", "selector": "pre", "class": "highlight"}
        ]}"#,
    )
    .unwrap();

    pagefold_cmd()
        .arg("apply")
        .arg("--pipeline")
        .arg(&pipeline_path)
        .arg(&html_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("<pre>let x = 1;</pre>"));
}

#[test]
fn split_from_stdin_as_json() {
    let output = pagefold_cmd()
        .args(["split", "--selector", "hr", "--json"])
        .write_stdin("<p>A</p><hr><p>B</p>")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parts: Vec<String> = serde_json::from_slice(&output).unwrap();
    assert_eq!(parts, vec!["<p>A</p>", "<p>B</p>"]);
}

#[test]
fn split_on_start_drops_leading_content() {
    pagefold_cmd()
        .args(["split", "-s", "h2", "--on-start"])
        .write_stdin("<p>intro</p><h2>One</h2><h2>Two</h2>")
        .assert()
        .success()
        .stdout("<h2>One</h2>\n\n<h2>Two</h2>\n");
}

#[test]
fn split_document_uses_body() {
    pagefold_cmd()
        .args(["split", "-s", "hr", "--document", "--placement", "before"])
        .write_stdin("<html><head><title>T</title></head><body><p>A</p><hr><p>B</p></body></html>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>A</p><hr>"))
        .stdout(predicate::str::contains("<title>").not());
}

#[test]
fn output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("parts.json");

    pagefold_cmd()
        .args(["split", "-s", "hr", "--json", "-o"])
        .arg(&output_path)
        .write_stdin("<p>A</p><hr><p>B</p>")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output_content = fs::read_to_string(&output_path).unwrap();
    assert!(
        output_content.contains("\"<p>B</p>\""),
        "output file should contain the JSON partitions"
    );
}

#[test]
fn invalid_selector_fails() {
    pagefold_cmd()
        .args(["split", "-s", "p["])
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid selector"));
}

#[test]
fn missing_step_field_fails() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline_path = temp_dir.path().join("pipeline.json");
    fs::write(&pipeline_path, r#"{"steps": [{"op": "wrap", "selector": "p"}]}"#).unwrap();

    pagefold_cmd()
        .arg("apply")
        .arg("-p")
        .arg(&pipeline_path)
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required argument `markup`"));
}

#[test]
fn missing_input_file_fails() {
    pagefold_cmd()
        .args(["split", "-s", "hr", "/nonexistent/page.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn unknown_placement_is_rejected() {
    pagefold_cmd()
        .args(["split", "-s", "hr", "--placement", "sideways"])
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown placement"));
}
