//! End-to-end runs of the `originality` binary against the offline stub.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::NamedTempFile;

fn fast_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
version: "1.0"
provider:
  mode: "fast"
  stub_dimension: 32
"#,
    )
    .unwrap();
    file
}

fn run(args: &[&str], config: &NamedTempFile, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_originality"))
        .args(args)
        .env("ORIGINALITY_CONFIG", config.path())
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // the binary may exit before reading stdin (usage and config errors)
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

#[test]
fn check_reads_stdin_and_prints_json() {
    let config = fast_config();
    let output = run(&["check"], &config, "The council voted on the new bus routes.\n");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["aiPercentage"].as_u64().unwrap() <= 100);
    assert_eq!(json["degraded"], false);
}

#[test]
fn check_reads_a_file_argument() {
    let config = fast_config();
    let mut input = NamedTempFile::new().unwrap();
    input.write_all(b"   ").unwrap();

    let path = input.path().to_str().unwrap();
    let output = run(&["check", path], &config, "");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["aiPercentage"], 0);
}

#[test]
fn paraphrase_with_stub_echoes_input() {
    let config = fast_config();
    let output = run(&["paraphrase", "-"], &config, "Keep this sentence.");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["paraphrasedText"], "Keep this sentence.");
    assert_eq!(json["fellBack"], true);
}

#[test]
fn over_long_input_fails() {
    let config = fast_config();
    let output = run(&["check"], &config, &"a".repeat(3001));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("3001"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let config = fast_config();
    let output = run(&["frobnicate"], &config, "");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn extra_positional_argument_is_rejected() {
    let config = fast_config();
    let output = run(&["check", "a.txt", "b.txt"], &config, "");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn help_lists_subcommands() {
    let config = fast_config();
    let output = run(&["--help"], &config, "");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for command in ["check", "paraphrase", "rewrite"] {
        assert!(help.contains(command), "{command} missing from help");
    }
}

#[test]
fn broken_config_file_is_reported() {
    let mut config = NamedTempFile::new().unwrap();
    config.write_all(b"version: \"7\"\n").unwrap();
    let output = run(&["check"], &config, "text");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported config version"));
}
