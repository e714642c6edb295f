//! CLI integration tests

use std::process::Command;

fn asctl(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "asctl", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = asctl(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Auto Start/Stop"), "Should show app name");
    assert!(stdout.contains("run"), "Should show run command");
    assert!(stdout.contains("locate"), "Should show locate command");
    assert!(stdout.contains("encode"), "Should show encode command");
    assert!(stdout.contains("decode"), "Should show decode command");
    assert!(stdout.contains("policies"), "Should show policies command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = asctl(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("asctl"), "Should show binary name");
}

/// Test run subcommand help
#[test]
fn test_run_help() {
    let output = asctl(&["run", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Run help should succeed");
    assert!(stdout.contains("--automation"), "Should show automation option");
    assert!(stdout.contains("--resource"), "Should show resource option");
    assert!(stdout.contains("--tag-value"), "Should show tag value option");
    assert!(stdout.contains("DCP/AutoStartStop"), "Should show default tag key");
}

/// Test locate rejects unknown resource categories before any network call
#[test]
fn test_locate_rejects_unknown_resource() {
    let output = asctl(&[
        "--region",
        "ap-southeast-1",
        "locate",
        "--resource",
        "lambda",
        "--tag-value",
        "OfficeHour",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown resource should fail");
    assert!(stderr.contains("lambda"), "Should name the bad value");
}

/// Test encode prints the scaling tag value as JSON
#[test]
fn test_encode_json() {
    let output = asctl(&["--format", "json", "encode", "--min", "1", "--max", "5", "--desired", "2"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Encode should succeed");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Should print JSON");
    assert_eq!(
        json["tagValue"],
        "eyJtaW5TaXplIjoxLCJtYXhTaXplIjo1LCJkZXNpcmVkU2l6ZSI6Mn0="
    );
}

/// Test encode rejects a desired size outside min..max
#[test]
fn test_encode_rejects_inconsistent_capacity() {
    let output = asctl(&["encode", "--min", "2", "--max", "5", "--desired", "7"]);
    assert!(!output.status.success(), "Inconsistent capacity should fail");
}

/// Test decode accepts values written with spaced JSON
#[test]
fn test_decode_spaced_json() {
    let output = asctl(&[
        "--format",
        "json",
        "decode",
        "eyJtaW5TaXplIjogMSwgIm1heFNpemUiOiA1LCAiZGVzaXJlZFNpemUiOiAyfQ==",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Decode should succeed");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Should print JSON");
    assert_eq!(json["minSize"], 1);
    assert_eq!(json["maxSize"], 5);
    assert_eq!(json["desiredSize"], 2);
}

/// Test decode rejects garbage
#[test]
fn test_decode_invalid_token() {
    let output = asctl(&["decode", "@@@"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Invalid token should fail");
    assert!(stderr.contains("scaling tag"), "Should explain the failure");
}

/// Test policies lists every recognised tag value
#[test]
fn test_policies() {
    let output = asctl(&["policies"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Policies should succeed");
    for value in [
        "OfficeHour",
        "ExtendedOfficeHour1",
        "ExtendedOfficeHour2",
        "UpperHalf",
        "LowerHalf",
        "RecurringStop",
    ] {
        assert!(stdout.contains(value), "Should list {}", value);
    }
}
