use std::process::Command;

fn recent_series() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recent_series"));
    cmd.env("CLIMON_STORE_BACKEND", "memory")
        .env("CLIMON_OTEL_ENABLED", "false")
        .env("RUST_LOG", "debug");
    cmd
}

#[test]
fn test_stdout_is_a_single_json_document() {
    let output = recent_series().arg("1").output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    // from_slice rejects trailing content such as log lines
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["window_hours"], 1);
    assert!(document["table"].as_array().unwrap().is_empty());
    assert!(document["chart"].as_object().unwrap().is_empty());

    let logs = String::from_utf8_lossy(&output.stderr);
    assert!(logs.contains("in-memory reading store"));
}

#[test]
fn test_invalid_window_argument_fails() {
    let output = recent_series().arg("a week").output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
