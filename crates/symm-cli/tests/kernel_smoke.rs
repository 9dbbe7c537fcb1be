use std::fs;
use std::path::Path;
use std::process::Command;

use symm_core::Case;

fn write_cases(path: &Path) {
    let pairs = [
        (2, 2),
        (3, 3),
        (5, 5),
        (7, 7),
        (5, 5),
        (7, 7),
        (3, 3),
        (5, 5),
        (7, 7),
        (4, 2),
        (6, 3),
        (8, 4),
        (5, 1),
        (7, 1),
        (1, 3),
        (2, 4),
        (1, 5),
        (1, 7),
    ];
    let cases: Vec<Case> = pairs
        .into_iter()
        .map(|(known, predicted)| Case::new(known, Some(predicted)).with_score(0.8))
        .collect();
    fs::write(path, serde_json::to_string(&cases).unwrap()).unwrap();
}

#[test]
fn kernel_command_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let cases = dir.path().join("cases.json");
    write_cases(&cases);
    let matrix = dir.path().join("kernel.tsv");
    let report = dir.path().join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_symm-order"))
        .args(["kernel", "--epsilon", "0.001", "--power", "2", "--cases"])
        .arg(&cases)
        .arg("--matrix-out")
        .arg(&matrix)
        .arg("--report")
        .arg(&report)
        .output()
        .expect("run symm-order kernel");
    assert!(
        output.status.success(),
        "kernel command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("π=["));
    assert!(stdout.contains("K^2[1]="));
    assert_eq!(fs::read_to_string(&matrix).unwrap().lines().count(), 8);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["comparison"]["agrees"], serde_json::Value::Bool(true));
}

#[test]
fn kernel_command_fails_without_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let cases = dir.path().join("cases.json");
    fs::write(&cases, "[]").unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_symm-order"))
        .args(["kernel", "--cases"])
        .arg(&cases)
        .status()
        .expect("run symm-order kernel");
    assert!(!status.success());
}

#[test]
fn accuracy_command_prints_percentage() {
    let dir = tempfile::tempdir().unwrap();
    let cases = dir.path().join("cases.json");
    write_cases(&cases);
    let output = Command::new(env!("CARGO_BIN_EXE_symm-order"))
        .args(["accuracy", "--cases"])
        .arg(&cases)
        .output()
        .expect("run symm-order accuracy");
    assert!(output.status.success());
    // 9 of the 15 symmetric cases are predicted exactly.
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "60%");
}
