//! Integration tests for `execjs --json runtimes` output.

use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "execjs-cli", "--bin", "execjs", "--"]);
    cmd
}

#[test]
fn test_runtimes_json_lists_builtins() {
    let output = cargo_bin()
        .args(["--json", "runtimes"])
        .output()
        .expect("Failed to run runtimes command");

    assert!(output.status.success(), "runtimes should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let rows = json.as_array().expect("expected an array");

    let names: Vec<&str> = rows.iter().filter_map(|row| row["name"].as_str()).collect();
    for expected in ["Node.js (V8)", "JavaScriptCore", "SpiderMonkey", "JScript"] {
        assert!(names.contains(&expected), "missing {expected}");
    }

    for row in rows {
        assert!(row["available"].is_boolean(), "available must be a bool");
        assert!(row["deprecated"].is_boolean(), "deprecated must be a bool");
        if row["available"] == false {
            assert!(row["binary"].is_null(), "unavailable runtimes have no binary");
        }
    }
}

#[test]
fn test_unknown_runtime_fails_with_json_error() {
    let output = cargo_bin()
        .args(["--json", "--runtime", "Chakra", "eval", "1"])
        .output()
        .expect("Failed to run eval command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Chakra is unavailable"), "stderr: {stderr}");
}
