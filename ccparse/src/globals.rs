//! Device-wide facts: identity, VLANs, VRFs, NTP, logging and AAA.

use std::collections::BTreeMap;

use ccparse_core::{ConfigDocument, GroupMap, SectionEntry};
use serde::Serialize;

use crate::dialect::Dialect;
use crate::lookup::{take, Lookup};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VlanFacts {
    pub name: Option<String>,
    pub device_tracking_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VrfFacts {
    pub rd: Option<String>,
    pub description: Option<String>,
}

/// `ntp server` or `ntp peer` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NtpServer {
    pub server: String,
    pub vrf: Option<String>,
    pub source_interface: Option<String>,
    pub key: Option<String>,
    pub prefer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NtpAuthenticationKey {
    pub key: String,
    pub hash_algorithm: Option<String>,
    pub hash: Option<String>,
    pub encryption_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NtpFacts {
    pub source: Option<String>,
    pub authenticate: bool,
    pub servers: Vec<NtpServer>,
    pub peers: Vec<NtpServer>,
    /// Access type (`peer`, `serve`, ...) to ACL name.
    pub access_groups: BTreeMap<String, String>,
    pub authentication_keys: Vec<NtpAuthenticationKey>,
    /// Compressed key list.
    pub trusted_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoggingServer {
    pub server: String,
    pub vrf: Option<String>,
    pub protocol: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoggingFacts {
    pub source_interface: Option<String>,
    pub source_vrf: Option<String>,
    pub servers: Vec<LoggingServer>,
}

/// `tacacs server` or `radius server` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AaaServer {
    pub name: String,
    pub address_version: Option<String>,
    pub server: Option<String>,
    pub encryption_type: Option<String>,
    pub hash: Option<String>,
    pub timeout: Option<u32>,
    pub retransmit: Option<u32>,
    pub auth_port: Option<u16>,
    pub acct_port: Option<u16>,
    pub single_connection: bool,
    /// Field patterns that matched more than one child line.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
}

/// `aaa group server` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AaaGroup {
    pub name: String,
    pub vrf: Option<String>,
    pub source_interface: Option<String>,
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AaaFacts {
    pub tacacs_servers: Vec<AaaServer>,
    pub radius_servers: Vec<AaaServer>,
    pub tacacs_groups: Vec<AaaGroup>,
    pub radius_groups: Vec<AaaGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalFacts {
    pub hostname: Option<String>,
    pub domain_name: Option<String>,
    pub name_servers: Vec<String>,
    pub cdp: bool,
    pub vlans: BTreeMap<u32, VlanFacts>,
    /// Group name to compressed VLAN list.
    pub vlan_groups: BTreeMap<String, Vec<String>>,
    pub vrfs: BTreeMap<String, VrfFacts>,
    pub ntp: NtpFacts,
    pub logging: LoggingFacts,
    pub aaa: AaaFacts,
}

/// Extract every global fact of `doc`.
pub fn extract(doc: &ConfigDocument, dialect: &Dialect) -> GlobalFacts {
    let lookup = Lookup::new(doc, dialect);
    GlobalFacts {
        hostname: lookup.first_value("hostname", "hostname"),
        domain_name: lookup.first_value("domain_name", "domain_name"),
        name_servers: name_servers(&lookup),
        cdp: lookup.find("cdp_disabled").is_empty(),
        vlans: vlans(&lookup),
        vlan_groups: vlan_groups(&lookup),
        vrfs: vrfs(&lookup),
        ntp: ntp(&lookup),
        logging: logging(&lookup),
        aaa: aaa(&lookup),
    }
}

fn name_servers(lookup: &Lookup<'_>) -> Vec<String> {
    lookup
        .find("name_server")
        .into_iter()
        .filter_map(|line| lookup.on(line).value("name_server", "name_servers"))
        .flat_map(|servers| {
            servers
                .split_whitespace()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn vlans(lookup: &Lookup<'_>) -> BTreeMap<u32, VlanFacts> {
    let mut vlans: BTreeMap<u32, VlanFacts> = BTreeMap::new();
    for line in lookup.find("vlan") {
        let query = lookup.on(line);
        let Some(range) = query
            .value("vlan", "vlan_list")
            .and_then(|text| lookup.range(&text))
        else {
            continue;
        };
        let name = query.child_value("vlan_name", "vlan_name");
        for vlan_id in range.iter().filter_map(|token| token.as_number()) {
            vlans.entry(vlan_id).or_default().name = name.clone();
        }
    }

    for line in lookup.find("vlan_configuration") {
        let query = lookup.on(line);
        let Some(policy) = query.child_value("device_tracking_policy", "policy") else {
            continue;
        };
        let Some(range) = query
            .value("vlan_configuration", "vlan_range")
            .and_then(|text| lookup.range(&text))
        else {
            continue;
        };
        for vlan_id in range.iter().filter_map(|token| token.as_number()) {
            vlans.entry(vlan_id).or_default().device_tracking_policy = Some(policy.clone());
        }
    }
    vlans
}

fn vlan_groups(lookup: &Lookup<'_>) -> BTreeMap<String, Vec<String>> {
    let mut lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in lookup.find("vlan_group") {
        let Some(mut values) = lookup.on(line).all("vlan_group") else {
            continue;
        };
        if let (Some(group), Some(list)) = (take(&mut values, "group"), take(&mut values, "vlan_list")) {
            lists.entry(group).or_default().push(list);
        }
    }
    lists
        .into_iter()
        .map(|(group, parts)| {
            let compressed = lookup
                .range(&parts.join(","))
                .map(|range| range.compressed().to_vec())
                .unwrap_or_default();
            (group, compressed)
        })
        .collect()
}

fn vrfs(lookup: &Lookup<'_>) -> BTreeMap<String, VrfFacts> {
    lookup
        .dialect
        .section_entries(lookup.doc, "vrfs")
        .into_iter()
        .filter_map(|mut entry| {
            let name = take(&mut entry.values, "vrf_name")?;
            let facts = VrfFacts {
                rd: take(&mut entry.values, "rd"),
                description: take(&mut entry.values, "description"),
            };
            Some((name, facts))
        })
        .collect()
}

fn ntp_server(mut values: GroupMap) -> Option<NtpServer> {
    Some(NtpServer {
        server: take(&mut values, "server")?,
        vrf: take(&mut values, "vrf"),
        source_interface: take(&mut values, "source_interface"),
        key: take(&mut values, "key"),
        prefer: take(&mut values, "prefer").is_some(),
    })
}

fn ntp(lookup: &Lookup<'_>) -> NtpFacts {
    let servers = lookup
        .autoparse(
            "ntp_server",
            &["ntp_server", "source_interface", "source_vrf", "ntp_key", "ntp_prefer"],
        )
        .into_iter()
        .filter_map(ntp_server)
        .collect();
    let peers = lookup
        .autoparse(
            "ntp_peer",
            &["ntp_peer", "source_interface", "source_vrf", "ntp_key"],
        )
        .into_iter()
        .filter_map(ntp_server)
        .collect();

    let mut access_groups = BTreeMap::new();
    for line in lookup.find("ntp_access_group") {
        if let Some(mut values) = lookup.on(line).all("ntp_access_group") {
            if let (Some(kind), Some(acl)) = (take(&mut values, "access_type"), take(&mut values, "acl")) {
                access_groups.insert(kind, acl);
            }
        }
    }

    let authentication_keys = lookup
        .autoparse("ntp_authentication_key", &["ntp_authentication_key"])
        .into_iter()
        .filter_map(|mut values| {
            Some(NtpAuthenticationKey {
                key: take(&mut values, "key")?,
                hash_algorithm: take(&mut values, "hash_algorithm"),
                hash: take(&mut values, "hash"),
                encryption_type: take(&mut values, "encryption_type"),
            })
        })
        .collect();

    let trusted: Vec<String> = lookup
        .find("ntp_trusted_key")
        .into_iter()
        .filter_map(|line| lookup.on(line).value("ntp_trusted_key", "key"))
        .collect();
    let trusted_keys = if trusted.is_empty() {
        Vec::new()
    } else {
        lookup
            .range(&trusted.join(","))
            .map(|range| range.compressed().to_vec())
            .unwrap_or_default()
    };

    let sources = lookup.find("ntp_source");
    let source = match sources.as_slice() {
        [only] => lookup.on(*only).value("ntp_source", "source"),
        [] => None,
        _ => {
            lookup
                .doc
                .logger()
                .warn(format_args!("{} ntp source statements found, ignoring all", sources.len()));
            None
        }
    };

    NtpFacts {
        source,
        authenticate: !lookup.find("ntp_authenticate").is_empty(),
        servers,
        peers,
        access_groups,
        authentication_keys,
        trusted_keys,
    }
}

fn logging(lookup: &Lookup<'_>) -> LoggingFacts {
    let servers = lookup
        .autoparse(
            "logging_host",
            &["logging_host", "source_vrf", "logging_transport"],
        )
        .into_iter()
        .filter_map(|mut values| {
            Some(LoggingServer {
                server: take(&mut values, "server")?,
                vrf: take(&mut values, "vrf"),
                protocol: take(&mut values, "protocol"),
                port: take(&mut values, "port").and_then(|port| port.parse().ok()),
            })
        })
        .collect();

    let source = lookup.find("logging_source").into_iter().next();
    let (source_interface, source_vrf) = match source {
        Some(line) => {
            let query = lookup.on(line);
            (
                query.value("logging_source", "source_interface"),
                query.value("source_vrf", "vrf"),
            )
        }
        None => (None, None),
    };

    LoggingFacts {
        source_interface,
        source_vrf,
        servers,
    }
}

fn aaa_server(mut entry: SectionEntry) -> Option<AaaServer> {
    let values = &mut entry.values;
    Some(AaaServer {
        name: take(values, "name")?,
        address_version: take(values, "address_version"),
        server: take(values, "server"),
        encryption_type: take(values, "encryption_type"),
        hash: take(values, "hash"),
        timeout: take(values, "timeout").and_then(|value| value.parse().ok()),
        retransmit: take(values, "retransmit").and_then(|value| value.parse().ok()),
        auth_port: take(values, "auth_port").and_then(|value| value.parse().ok()),
        acct_port: take(values, "acct_port").and_then(|value| value.parse().ok()),
        single_connection: take(values, "single_connection").is_some(),
        conflicts: entry
            .conflicts
            .into_iter()
            .map(|conflict| conflict.pattern)
            .collect(),
    })
}

fn aaa_groups(lookup: &Lookup<'_>, section: &str) -> Vec<AaaGroup> {
    lookup
        .dialect
        .section_entries(lookup.doc, section)
        .into_iter()
        .filter_map(|mut entry| {
            let servers = lookup
                .doc
                .line(entry.line)
                .map(|line| lookup.on(line).child_values("aaa_group_server", "name"))
                .unwrap_or_default();
            Some(AaaGroup {
                name: take(&mut entry.values, "name")?,
                vrf: take(&mut entry.values, "vrf"),
                source_interface: take(&mut entry.values, "source_interface"),
                servers,
            })
        })
        .collect()
}

fn aaa(lookup: &Lookup<'_>) -> AaaFacts {
    let servers = |section: &str| -> Vec<AaaServer> {
        lookup
            .dialect
            .section_entries(lookup.doc, section)
            .into_iter()
            .filter_map(aaa_server)
            .collect()
    };
    AaaFacts {
        tacacs_servers: servers("tacacs_servers"),
        radius_servers: servers("radius_servers"),
        tacacs_groups: aaa_groups(lookup, "tacacs_groups"),
        radius_groups: aaa_groups(lookup, "radius_groups"),
    }
}

#[cfg(test)]
mod tests {
    use ccparse_core::ConfigDocument;
    use pretty_assertions::assert_eq;

    use super::{extract, NtpServer};
    use crate::dialect::Dialect;

    #[test]
    fn reads_identity_and_dns() {
        let doc = ConfigDocument::from_text(
            "hostname EDGE-1\nip domain-name corp.example\nip name-server 10.1.1.1 10.1.1.2\nno cdp run\n",
        );
        let dialect = Dialect::ios().expect("dialect");
        let facts = extract(&doc, &dialect);

        assert_eq!(facts.hostname.as_deref(), Some("EDGE-1"));
        assert_eq!(facts.domain_name.as_deref(), Some("corp.example"));
        assert_eq!(facts.name_servers, vec!["10.1.1.1", "10.1.1.2"]);
        assert!(!facts.cdp);
    }

    #[test]
    fn vlan_list_definition_covers_every_member() {
        let doc = ConfigDocument::from_text("vlan 10,20-22\n name BULK\nvlan 30\n");
        let dialect = Dialect::ios().expect("dialect");
        let facts = extract(&doc, &dialect);

        let ids: Vec<u32> = facts.vlans.keys().copied().collect();
        assert_eq!(ids, vec![10, 20, 21, 22, 30]);
        for id in [10, 20, 21, 22] {
            assert_eq!(facts.vlans[&id].name.as_deref(), Some("BULK"));
        }
        assert_eq!(facts.vlans[&30].name, None);
    }

    #[test]
    fn absent_features_are_empty() {
        let doc = ConfigDocument::from_text("interface Loopback0\n");
        let dialect = Dialect::ios().expect("dialect");
        let facts = extract(&doc, &dialect);

        assert_eq!(facts.hostname, None);
        assert!(facts.cdp);
        assert!(facts.vlans.is_empty());
        assert!(facts.ntp.servers.is_empty());
        assert!(facts.aaa.tacacs_servers.is_empty());
    }

    #[test]
    fn vlan_configuration_spreads_policy_over_range() {
        let doc = ConfigDocument::from_text(
            "vlan 10\n name USERS\nvlan 11\nvlan configuration 10-12\n device-tracking attach-policy DT\n",
        );
        let dialect = Dialect::ios().expect("dialect");
        let facts = extract(&doc, &dialect);

        assert_eq!(facts.vlans.len(), 3);
        assert_eq!(facts.vlans[&10].name.as_deref(), Some("USERS"));
        assert_eq!(facts.vlans[&11].name, None);
        assert_eq!(facts.vlans[&12].device_tracking_policy.as_deref(), Some("DT"));
    }

    #[test]
    fn ntp_servers_pick_up_optional_keywords() {
        let doc = ConfigDocument::from_text(
            "ntp server vrf MGMT 10.0.0.1 key 3 prefer source Loopback0\nntp server ntp.example.net\nntp trusted-key 1 - 3\nntp trusted-key 7\n",
        );
        let dialect = Dialect::ios().expect("dialect");
        let ntp = extract(&doc, &dialect).ntp;

        assert_eq!(
            ntp.servers,
            vec![
                NtpServer {
                    server: "10.0.0.1".to_string(),
                    vrf: Some("MGMT".to_string()),
                    source_interface: Some("Loopback0".to_string()),
                    key: Some("3".to_string()),
                    prefer: true,
                },
                NtpServer {
                    server: "ntp.example.net".to_string(),
                    ..NtpServer::default()
                },
            ]
        );
        assert_eq!(ntp.trusted_keys, vec!["1-3", "7"]);
    }
}
