use std::{path::Path, process::Command};

#[test]
fn cli_runs_demo_scenario() {
    let scenario = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scenario.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_warden-defence"))
        .arg("--scenario")
        .arg(&scenario)
        .args(["--ticks", "120", "--seed", "3"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to invoke warden-defence CLI binary");

    assert!(output.status.success(), "demo scenario should run to completion");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("towers_built="),
        "summary line missing from output: {stdout}"
    );
}

#[test]
fn cli_reports_missing_scenario() {
    let output = Command::new(env!("CARGO_BIN_EXE_warden-defence"))
        .args(["--scenario", "does-not-exist.toml"])
        .output()
        .expect("failed to invoke warden-defence CLI binary");

    assert!(!output.status.success(), "missing scenario must fail");
}
