use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn facts_json(extra: &[&str]) -> Value {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    let output = cmd
        .arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--format")
        .arg("json")
        .args(extra)
        .output()
        .expect("run ccparse");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn facts_text_lists_sections_and_interfaces() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("- hostname: SW-ACCESS-01"))
        .stdout(predicate::str::contains("interface Po1 (Port-channel1)"))
        .stdout(predicate::str::contains("- trunk_allowed_vlans: 10,20,30,99"))
        .stdout(predicate::str::contains("- standby.groups.10.priority: 110"));
}

#[test]
fn facts_json_minimal_drops_nulls() {
    let json = facts_json(&[]);
    assert_eq!(json["globals"]["hostname"], "SW-ACCESS-01");
    assert_eq!(json["result_mode"], "minimal");

    let po = &json["interfaces"][0];
    assert_eq!(po["name"], "Port-channel1");
    assert!(po.get("vrf").is_none());
    assert_eq!(po["trunk_allowed_vlans"], serde_json::json!(["10", "20", "30", "99"]));
}

#[test]
fn facts_json_complete_keeps_nulls() {
    let json = facts_json(&["--complete"]);
    assert_eq!(json["result_mode"], "complete");
    let po = &json["interfaces"][0];
    assert!(po.get("vrf").is_some_and(Value::is_null));
}

#[test]
fn facts_single_interface() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--interface")
        .arg("Gi1/0/48")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"channel_group\""))
        .stdout(predicate::str::contains("\"active\""));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--interface")
        .arg("Gi9/9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interface 'Gi9/9' not found"));
}

#[test]
fn facts_without_markers_is_an_error_unless_untrimmed() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/no_markers.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-trim"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg("--no-trim")
        .arg(fixture("fixtures/no_markers.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("HEADLESS"));
}

#[test]
fn facts_uses_dialect_override() {
    let embedded =
        fs::read_to_string(fixture("ccparse/dialects/ios.toml")).expect("read embedded dialect");
    let custom = embedded.replacen(
        r#"regex = '^hostname (?P<hostname>\S+)'"#,
        r#"regex = '^hostname (?P<hostname>SW)'"#,
        1,
    );
    assert_ne!(custom, embedded);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    fs::write(&path, custom).expect("write dialect");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--dialect-file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("- hostname: SW\n"));
}

#[test]
fn facts_rejects_broken_dialect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "name = \"broken\"\n").expect("write dialect");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("facts")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--dialect-file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid dialect"));
}
