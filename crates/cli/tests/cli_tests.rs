//! CLI integration tests

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kubectl-consolidation"))
        .args(args)
        // Keep a developer's real cluster out of reach
        .env("KUBECONFIG", "/nonexistent/kubeconfig")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Karpenter"), "Should describe the tool");
    assert!(stdout.contains("[NODE]..."), "Should show node arguments");
    assert!(stdout.contains("--selector"), "Should show selector option");
    assert!(stdout.contains("--pods"), "Should show pods option");
    assert!(stdout.contains("--no-headers"), "Should show no-headers option");
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig option");
    assert!(stdout.contains("--context"), "Should show context option");
    assert!(
        stdout.contains("--request-timeout"),
        "Should show request-timeout option"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(
        stdout.contains("kubectl-consolidation"),
        "Should show binary name"
    );
}

/// Test output option values
#[test]
fn test_output_option() {
    let output = run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--output"), "Should show output option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
    assert!(stdout.contains("yaml"), "Should show yaml format");
}

/// Test that --pods without node names is rejected before contacting a cluster
#[test]
fn test_pods_requires_node_names() {
    let output = run(&["--pods"]);

    assert!(!output.status.success(), "--pods alone should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--pods flag requires at least one node name"),
        "Should explain the missing node names, got: {}",
        stderr
    );
    assert!(
        !stderr.contains("kubeconfig"),
        "Should fail before loading any kubeconfig"
    );
}

/// Test that --pods with a selector but no names is still rejected
#[test]
fn test_pods_with_selector_only() {
    let output = run(&["--pods", "-l", "karpenter.sh/nodepool=default"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--pods flag requires at least one node name"));
}

/// Test invalid output format error handling
#[test]
fn test_invalid_output_format() {
    let output = run(&["-o", "xml"]);

    assert!(!output.status.success(), "Unknown format should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value"),
        "Should reject the format value"
    );
}

/// Test that an unreadable kubeconfig is reported as an error
#[test]
fn test_missing_kubeconfig() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("config");

    let output = run(&["--kubeconfig", missing.to_str().unwrap()]);

    assert!(!output.status.success(), "Missing kubeconfig should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to read kubeconfig"),
        "Should report the kubeconfig failure, got: {}",
        stderr
    );
}
