use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn tree_trims_dump_header_and_footer() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg(fixture("fixtures/ios_switch.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("version 15.2"))
        .stdout(predicate::str::contains("hostname SW-ACCESS-01"))
        .stdout(predicate::str::contains("Building configuration").not())
        .stdout(predicate::str::contains("SW-ACCESS-01#").not());
}

#[test]
fn tree_repairs_misindented_children() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.env("NO_COLOR", "1")
        .arg("tree")
        .arg(fixture("fixtures/misindented.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^\s+\d+  0 P-- interface FastEthernet0/1$").unwrap());
}

#[test]
fn tree_selects_section_by_parent() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--parent")
        .arg("interface Vlan10")
        .assert()
        .success()
        .stdout(predicate::str::contains("standby 10 preempt"))
        .stdout(predicate::str::contains("vrf forwarding MGMT").not());
}

#[test]
fn tree_fails_on_unknown_parent() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg(fixture("fixtures/ios_switch.txt"))
        .arg("--parent")
        .arg("router bgp")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no unique section"));
}

#[test]
fn tree_without_markers_needs_no_trim() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg(fixture("fixtures/no_markers.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("HEADLESS").not());

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg("--no-trim")
        .arg(fixture("fixtures/no_markers.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("hostname HEADLESS"));
}

#[test]
fn tree_reports_missing_file() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccparse"));
    cmd.arg("tree")
        .arg(fixture("fixtures/does-not-exist.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
