use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "taxe-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_taxe-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args(["--report", "json", "--turns", "12", "--seed", "42", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json");
    assert_eq!(value["seed"], 42);
    assert_eq!(value["reports"].as_array().map(Vec::len), Some(12));
}

#[test]
fn cli_console_report_names_players() {
    let exe = env!("CARGO_BIN_EXE_taxe-tester");
    let output = Command::new(exe)
        .args(["--turns", "5", "--players", "3"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TaxE Turn Simulator"));
    assert!(stdout.contains("Player 3"));
}

#[test]
fn cli_rejects_invalid_rules() {
    let exe = env!("CARGO_BIN_EXE_taxe-tester");
    let rules_path = temp_path("rules");
    std::fs::write(&rules_path, r#"{ "block_probability": 3.0 }"#).expect("write rules");
    let output = Command::new(exe)
        .arg("--rules")
        .arg(&rules_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("block_probability"));
}

#[test]
fn cli_rejects_zero_players() {
    let exe = env!("CARGO_BIN_EXE_taxe-tester");
    let output = Command::new(exe)
        .args(["--players", "0"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--players"));
}
