use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use ccparse_core::{ConfigDocument, Level, Logger, MemorySink, ParseOptions, Pattern};
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn dump_is_trimmed_between_version_and_end() {
    let doc = ConfigDocument::from_path(fixture("fixtures/ios_switch.txt"));
    let first = doc.line(0).expect("first line");
    assert_eq!(first.text(), "version 15.2");
    assert_eq!(doc.lines().last().map(|line| line.text()), Some("end"));
    assert!(doc.lines().all(|line| !line.text().contains("Building configuration")));
}

#[test]
fn misindented_dump_is_repaired() {
    let doc = ConfigDocument::from_path(fixture("fixtures/misindented.txt"));
    let interface = Pattern::new(r"^interface FastEthernet0/1").expect("pattern");
    let found = doc.find_objects(&interface);
    assert_eq!(found.len(), 1);

    let children: Vec<&str> = found[0].children().iter().map(|line| line.text()).collect();
    assert_eq!(
        children,
        vec![
            " description three spaces",
            " switchport mode access",
            "  switchport access vlan 5",
        ]
    );
}

#[test]
fn missing_markers_give_empty_document() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::with_sink("load-test", sink.clone());
    let doc = ConfigDocument::load(fixture("fixtures/no_markers.txt"), &ParseOptions::dump(), logger);

    assert!(doc.is_empty());
    assert_eq!(sink.at_level(Level::Error).len(), 1);
}

#[test]
fn loading_without_markers_keeps_everything() {
    let doc = ConfigDocument::load(
        fixture("fixtures/no_markers.txt"),
        &ParseOptions::default(),
        Logger::default(),
    );
    assert_eq!(doc.len(), 3);
    assert!(doc.line(1).expect("loopback").is_parent());
}

#[test]
fn missing_file_is_logged_not_raised() {
    let dir = tempdir().expect("tempdir");
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::with_sink("load-test", sink.clone());
    let doc = ConfigDocument::load(dir.path().join("absent.cfg"), &ParseOptions::dump(), logger);

    assert!(doc.is_empty());
    let errors = sink.at_level(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("absent.cfg"));
}

#[test]
fn crlf_dump_loads_like_lf() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("crlf.cfg");
    fs::write(&path, "version 12.4\r\nhostname R1\r\ninterface Loopback0\r\n ip address 1.1.1.1 255.255.255.255\r\nend\r\n")
        .expect("write config");

    let doc = ConfigDocument::from_path(&path);
    assert_eq!(
        doc.lines_text(),
        vec![
            "version 12.4",
            "hostname R1",
            "interface Loopback0",
            " ip address 1.1.1.1 255.255.255.255",
            "end",
        ]
    );
}

#[test]
fn level_below_top_carries_through_later_ascent() {
    let doc = ConfigDocument::from_lines(["a", "    b", "   c", "  d", " e", "     f"]);
    let indents: Vec<usize> = doc.lines().map(|line| line.indent()).collect();
    assert_eq!(indents, vec![0, 1, 0, 0, 0, 0]);

    let e = doc.line(4).expect("line 4");
    assert!(!e.is_parent());
    assert!(e.children().is_empty());
}
