//! Dialect definitions: pattern tables and section definitions loaded from TOML.

use std::fs;
use std::path::Path;

use ccparse_core::{ConfigDocument, PatternTable, SectionEntry, TableError};
use serde::Deserialize;
use thiserror::Error;

use crate::names::{InterfaceNameMap, NameMapping};

/// One named regex of a dialect file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternDef {
    pub name: String,
    pub regex: String,
}

/// Section-scoped extraction: `candidate` selects parent lines, every entry
/// of `fields` is searched among their children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionDef {
    pub name: String,
    pub candidate: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Raw dialect file as found on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct DialectFile {
    pub name: String,
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<PatternDef>,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionDef>,
    #[serde(default, rename = "interface_name")]
    pub interface_names: Vec<NameMapping>,
}

/// Errors returned when loading a dialect.
#[derive(Debug, Error)]
pub enum DialectLoadError {
    #[error("failed to read dialect file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse dialect file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid dialect {path}: {source}")]
    Table {
        path: String,
        source: TableError,
    },
    #[error("dialect {path} has no section named '{name}'")]
    MissingSection { path: String, name: String },
}

/// Pattern names every dialect must define.
pub const REQUIRED_PATTERNS: &[&str] = &[
    "hostname",
    "domain_name",
    "name_server",
    "cdp_disabled",
    "vlan",
    "vlan_name",
    "vlan_configuration",
    "device_tracking_policy",
    "vlan_group",
    "ntp_server",
    "ntp_peer",
    "source_interface",
    "source_vrf",
    "ntp_key",
    "ntp_prefer",
    "ntp_access_group",
    "ntp_authentication_key",
    "ntp_trusted_key",
    "ntp_source",
    "ntp_authenticate",
    "logging_host",
    "logging_transport",
    "logging_source",
    "aaa_tacacs_group",
    "aaa_radius_group",
    "aaa_group_server",
    "interface",
    "if_description",
    "if_ip_address",
    "if_l3",
    "if_vrf",
    "if_shutdown",
    "if_ospf_priority",
    "if_cdp",
    "if_logging_event",
    "if_standby_ip",
    "if_standby_timers",
    "if_standby_priority",
    "if_standby_preempt",
    "if_standby_authentication",
    "if_standby_version",
    "if_helper_address",
    "if_native_vlan",
    "if_trunk_encapsulation",
    "if_switchport_mode",
    "if_trunk_allowed_vlans",
    "if_access_vlan",
    "if_voice_vlan",
    "if_channel_group",
    "if_speed",
    "if_duplex",
];

/// Section names every dialect must define.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "vrfs",
    "tacacs_servers",
    "radius_servers",
    "tacacs_groups",
    "radius_groups",
];

/// Compiled dialect.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    table: PatternTable,
    sections: Vec<SectionDef>,
    interface_names: InterfaceNameMap,
}

impl Dialect {
    /// Built-in IOS dialect.
    pub fn ios() -> Result<Self, DialectLoadError> {
        let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/dialects/ios.toml"));
        Self::from_toml(embedded, "embedded ios dialect".to_string())
    }

    /// Load a dialect from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DialectLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| DialectLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw, path.display().to_string())
    }

    /// The file at `path` when given, the built-in IOS dialect otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, DialectLoadError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::ios(),
        }
    }

    pub fn from_toml(raw: &str, path: String) -> Result<Self, DialectLoadError> {
        let file: DialectFile = toml::from_str(raw).map_err(|source| DialectLoadError::Parse {
            path: path.clone(),
            source,
        })?;
        Self::from_file(file, path)
    }

    pub fn from_file(file: DialectFile, path: String) -> Result<Self, DialectLoadError> {
        let table_err = |source: TableError| DialectLoadError::Table {
            path: path.clone(),
            source,
        };

        let table = PatternTable::compile(
            file.name.clone(),
            file.patterns.iter().map(|def| (def.name.clone(), def.regex.as_str())),
        )
        .map_err(table_err)?;

        table.resolve(REQUIRED_PATTERNS).map_err(table_err)?;
        for section in &file.sections {
            table.require(&section.candidate).map_err(table_err)?;
            table.resolve(section.fields.as_slice()).map_err(table_err)?;
        }
        for required in REQUIRED_SECTIONS {
            if !file.sections.iter().any(|section| section.name == *required) {
                return Err(DialectLoadError::MissingSection {
                    path,
                    name: (*required).to_string(),
                });
            }
        }

        Ok(Self {
            name: file.name,
            table,
            sections: file.sections,
            interface_names: InterfaceNameMap::new(file.interface_names),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn sections(&self) -> &[SectionDef] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn interface_names(&self) -> &InterfaceNameMap {
        &self.interface_names
    }

    /// Run the named section definition over `doc`. Unknown sections are logged and
    /// yield no entries.
    pub fn section_entries(&self, doc: &ConfigDocument, name: &str) -> Vec<SectionEntry> {
        let Some(section) = self.section(name) else {
            doc.logger()
                .error(format_args!("dialect '{}' has no section '{}'", self.name, name));
            return Vec::new();
        };
        let candidate = match self.table.require(&section.candidate) {
            Ok(pattern) => pattern,
            Err(err) => {
                doc.logger().error(format_args!("{err}"));
                return Vec::new();
            }
        };
        match self.table.resolve(section.fields.as_slice()) {
            Ok(fields) => doc.section_autoparse(candidate, &fields),
            Err(err) => {
                doc.logger().error(format_args!("{err}"));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ccparse_core::ConfigDocument;

    use super::{Dialect, DialectLoadError};

    #[test]
    fn embedded_dialect_loads() {
        let dialect = Dialect::ios().expect("embedded dialect");
        assert_eq!(dialect.name(), "ios");
        assert!(dialect.table().get("hostname").is_some());
        assert!(dialect.section("tacacs_servers").is_some());
    }

    #[test]
    fn missing_required_pattern_is_a_load_error() {
        let raw = r#"
name = "tiny"

[[pattern]]
name = "hostname"
regex = '^hostname (?P<hostname>\S+)'
"#;
        let err = Dialect::from_toml(raw, "tiny.toml".to_string()).expect_err("incomplete");
        assert!(matches!(err, DialectLoadError::Table { .. }));
    }

    #[test]
    fn invalid_regex_is_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(
            &path,
            r#"
name = "broken"

[[pattern]]
name = "hostname"
regex = '^hostname (?P<hostname>\S+'
"#,
        )
        .expect("write dialect");

        let err = Dialect::load(&path).expect_err("bad regex");
        match err {
            DialectLoadError::Table { path: reported, .. } => {
                assert!(reported.ends_with("broken.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn returns_parse_error_for_invalid_toml() {
        let err = Dialect::from_toml("name = [", "inline".to_string()).expect_err("parse");
        assert!(matches!(err, DialectLoadError::Parse { .. }));
    }

    #[test]
    fn section_entries_run_named_definition() {
        let dialect = Dialect::ios().expect("embedded dialect");
        let doc = ConfigDocument::from_text(
            "ip vrf RED\n rd 65000:1\n description Red tenant\nvrf definition BLUE\n rd 65000:2\n",
        );
        let entries = dialect.section_entries(&doc, "vrfs");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("vrf_name"), Some("RED"));
        assert_eq!(entries[0].get("description"), Some("Red tenant"));
        assert_eq!(entries[1].get("rd"), Some("65000:2"));

        assert!(dialect.section_entries(&doc, "bgp_neighbors").is_empty());
    }
}
