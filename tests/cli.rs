use std::fs;

use assert_cmd::Command;
use contagion::report::{HistogramRow, StatusReport};
use tempfile::tempdir;

#[test]
fn reports_json_lines_on_stdout() {
    let output = Command::cargo_bin("contagion")
        .unwrap()
        .args(["--ticks", "40", "--report-period", "20", "--random-seed", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let reports: Vec<StatusReport> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].hours_elapsed, 20);
    assert_eq!(reports[1].hours_elapsed, 40);
    let total: usize = reports[1]
        .infection_state_histogram
        .iter()
        .map(|entry| entry.count)
        .sum();
    assert_eq!(total, 5000);
}

#[test]
fn writes_csv_report_from_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("parameters.json");
    fs::write(&config, r#"{"population": 250, "interaction_radius": 0.02}"#).unwrap();
    let output_dir = dir.path().join("out");

    Command::cargo_bin("contagion")
        .unwrap()
        .args(["--quiet", "--ticks", "30", "--report-period", "10", "--tick", "2h"])
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout("");

    let mut reader = csv::Reader::from_path(output_dir.join("infection_states.csv")).unwrap();
    let rows: Vec<HistogramRow> = reader.deserialize().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].tick, 30);
    assert_eq!(rows[2].hours_elapsed, 60);
    let total = rows[2].uninfected
        + rows[2].infected_without_symptoms
        + rows[2].infected_with_symptoms
        + rows[2].recovered;
    assert_eq!(total, 250);
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("parameters.json");
    fs::write(&config, r#"{"transmission_probability": 2.0}"#).unwrap();

    Command::cargo_bin("contagion")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
