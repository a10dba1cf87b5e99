//! linebot 命令行集成测试

use assert_cmd::Command;
use predicates::prelude::*;

fn linebot() -> Command {
    Command::cargo_bin("linebot").unwrap()
}

#[test]
fn test_classify_prints_label() {
    linebot()
        .args(["classify", "130", "50", "50"])
        .assert()
        .success()
        .stdout(predicate::str::diff("RED\n"));

    linebot()
        .args(["classify", "10", "10", "250"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WHITE"));
}

#[test]
fn test_classify_rejects_out_of_range_channel() {
    linebot()
        .args(["classify", "300", "0", "0"])
        .assert()
        .failure();
}

#[test]
fn test_config_show_defaults() {
    linebot()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[markers]"))
        .stdout(predicate::str::contains("source_color = \"red\""))
        .stdout(predicate::str::contains("threshold = 80"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("robot.toml");
    let path = path.to_str().unwrap();

    linebot()
        .args(["config", "init", "--config", path])
        .assert()
        .success();
    linebot()
        .args(["config", "init", "--config", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    linebot()
        .args(["config", "show", "--config", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("target_color = \"green\""));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[markers]\nsource_color = \"black\"\n").unwrap();

    linebot()
        .args(["classify", "0", "0", "0", "--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("markers.source_color"));
}

#[test]
fn test_stop_sim() {
    linebot()
        .args(["stop", "--backend", "sim"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stop complete"));
}

#[test]
fn test_run_sim_one_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("linebot.log");

    linebot()
        .args([
            "run",
            "--backend",
            "sim",
            "--fast",
            "--sim-cancel-after",
            "30",
            "--max-runs",
            "1",
            "--log-file",
            log.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Finished 1 runs"));

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("State: IDLE -> TO_SOURCE"), "{}", text);
}

#[cfg(target_os = "linux")]
#[test]
fn test_run_ev3dev_without_devices_fails() {
    let dir = tempfile::tempdir().unwrap();
    linebot()
        .args([
            "run",
            "--backend",
            "ev3dev",
            "--sysfs-root",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}
