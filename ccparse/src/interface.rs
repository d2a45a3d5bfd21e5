//! Per-interface facts read from the children of `interface` lines.

use std::collections::BTreeMap;
use std::fmt;

use ccparse_core::{ConfigDocument, GroupMap, LineQuery, LineRef, Pattern};
use serde::{Serialize, Serializer};

use crate::dialect::Dialect;
use crate::lookup::{take, Lookup};

/// Interface patterns whose matching children count as processed.
pub const CONSUMED_FEATURES: &[&str] = &[
    "if_description",
    "if_ip_address",
    "if_no_ip_address",
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
    "if_switchport",
    "if_trunk_allowed_vlans",
    "if_access_vlan",
    "if_voice_vlan",
    "if_channel_group",
    "if_speed",
    "if_duplex",
    "if_portfast",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    L2,
    L3,
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortMode::L2 => f.write_str("l2"),
            PortMode::L3 => f.write_str("l3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpAddress {
    pub ip_address: String,
    pub mask: String,
    pub secondary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelGroup {
    pub number: u32,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandbyAuthentication {
    pub authentication_type: String,
    pub key_type: String,
    pub key_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandbyGroup {
    pub ip_addresses: Vec<IpAddress>,
    pub hello: Option<u32>,
    pub hold: Option<u32>,
    pub priority: Option<u32>,
    pub preempt: bool,
    pub authentication: Option<StandbyAuthentication>,
}

/// VLANs a trunk carries, from `switchport trunk allowed vlan` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedVlans {
    /// `allowed vlan none`: every VLAN is blocked.
    None,
    /// `allowed vlan all`.
    All,
    /// Compressed union of the listed and added VLANs.
    List(Vec<String>),
}

impl Serialize for AllowedVlans {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AllowedVlans::None => serializer.serialize_str("none"),
            AllowedVlans::All => serializer.serialize_str("all"),
            AllowedVlans::List(vlans) => vlans.serialize(serializer),
        }
    }
}

/// HSRP configuration of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standby {
    pub version: u8,
    pub groups: BTreeMap<u32, StandbyGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceFacts {
    /// Index of the `interface` line.
    pub line: usize,
    pub name: String,
    pub short_name: String,
    pub description: Option<String>,
    pub port_mode: PortMode,
    pub ip_addresses: Vec<IpAddress>,
    pub vrf: Option<String>,
    pub shutdown: bool,
    pub cdp: bool,
    pub ospf_priority: Option<u32>,
    pub logging_events: Vec<String>,
    pub switchport_mode: Option<String>,
    pub access_vlan: Option<u32>,
    pub voice_vlan: Option<u32>,
    pub native_vlan: Option<u32>,
    pub encapsulation: Option<String>,
    /// `None` when no `allowed vlan` line is configured.
    pub trunk_allowed_vlans: Option<AllowedVlans>,
    pub channel_group: Option<ChannelGroup>,
    pub speed: Option<u32>,
    pub duplex: Option<String>,
    pub helper_addresses: Vec<String>,
    pub standby: Option<Standby>,
    /// Child lines no interface pattern accounted for.
    pub unprocessed: Vec<String>,
}

/// Facts of every `interface` line in `doc`.
pub fn extract_all(doc: &ConfigDocument, dialect: &Dialect, global_cdp: bool) -> Vec<InterfaceFacts> {
    let lookup = Lookup::new(doc, dialect);
    lookup
        .find("interface")
        .into_iter()
        .filter(|line| !line.is_child())
        .filter_map(|line| extract_line(&lookup, line, global_cdp))
        .collect()
}

fn number(value: Option<String>) -> Option<u32> {
    value.and_then(|value| value.parse().ok())
}

fn extract_line(lookup: &Lookup<'_>, line: LineRef<'_>, global_cdp: bool) -> Option<InterfaceFacts> {
    let query = lookup.on(line);
    let name = query.value("interface", "interface")?;

    let descriptions = query.child_values("if_description", "description");
    let description = match descriptions.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    };

    let cdp = match query.child_maps("if_cdp").into_iter().next() {
        Some(mut values) => take(&mut values, "negated").is_none(),
        None => global_cdp,
    };

    Some(InterfaceFacts {
        line: line.index(),
        short_name: lookup.dialect.interface_names().to_short(&name),
        name,
        description,
        port_mode: if query.has_child("if_l3") {
            PortMode::L3
        } else {
            PortMode::L2
        },
        ip_addresses: ip_addresses(&query),
        vrf: query.child_value("if_vrf", "vrf"),
        shutdown: query.has_child("if_shutdown"),
        cdp,
        ospf_priority: number(query.child_value("if_ospf_priority", "ospf_priority")),
        logging_events: query.child_values("if_logging_event", "logging_event"),
        switchport_mode: query.child_value("if_switchport_mode", "switchport_mode"),
        access_vlan: number(query.child_value("if_access_vlan", "access_vlan")),
        voice_vlan: number(query.child_value("if_voice_vlan", "voice_vlan")),
        native_vlan: number(query.child_value("if_native_vlan", "native_vlan")),
        encapsulation: query.child_value("if_trunk_encapsulation", "encapsulation"),
        trunk_allowed_vlans: trunk_allowed_vlans(lookup, &query),
        channel_group: channel_group(&query),
        speed: number(query.child_value("if_speed", "speed")),
        duplex: query.child_value("if_duplex", "duplex"),
        helper_addresses: query.child_values("if_helper_address", "helper_address"),
        standby: standby(&query),
        unprocessed: unprocessed(lookup, line),
    })
}

fn ip_addresses(query: &LineQuery<'_>) -> Vec<IpAddress> {
    query
        .child_maps("if_ip_address")
        .into_iter()
        .filter_map(|mut values| {
            Some(IpAddress {
                ip_address: take(&mut values, "ip_address")?,
                mask: take(&mut values, "mask")?,
                secondary: take(&mut values, "secondary").is_some(),
            })
        })
        .collect()
}

fn trunk_allowed_vlans(lookup: &Lookup<'_>, query: &LineQuery<'_>) -> Option<AllowedVlans> {
    let parts = query.child_values("if_trunk_allowed_vlans", "allowed_vlans");
    if parts.is_empty() {
        return None;
    }
    if parts.iter().any(|part| part.eq_ignore_ascii_case("all")) {
        return Some(AllowedVlans::All);
    }
    // `none` followed by `add` lines leaves just the added VLANs
    let listed: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .filter(|part| !part.eq_ignore_ascii_case("none"))
        .collect();
    if listed.is_empty() {
        return Some(AllowedVlans::None);
    }
    lookup
        .range(&listed.join(","))
        .map(|range| AllowedVlans::List(range.compressed().to_vec()))
}

fn channel_group(query: &LineQuery<'_>) -> Option<ChannelGroup> {
    let mut values = query.child_maps("if_channel_group").into_iter().next()?;
    Some(ChannelGroup {
        number: number(take(&mut values, "channel_group_number"))?,
        mode: take(&mut values, "channel_group_mode")?,
    })
}

fn standby(query: &LineQuery<'_>) -> Option<Standby> {
    let addresses = query.child_maps("if_standby_ip");
    if addresses.is_empty() {
        return None;
    }

    let mut groups: BTreeMap<u32, StandbyGroup> = BTreeMap::new();
    for mut values in addresses {
        let Some(group) = number(take(&mut values, "standby_group")) else {
            continue;
        };
        if let Some(ip_address) = take(&mut values, "ip_address") {
            groups.entry(group).or_default().ip_addresses.push(IpAddress {
                ip_address,
                mask: String::new(),
                secondary: take(&mut values, "secondary").is_some(),
            });
        }
    }

    update_groups(query, &mut groups, "if_standby_timers", |entry, values| {
        entry.hello = number(take(values, "hello"));
        entry.hold = number(take(values, "hold"));
    });
    update_groups(query, &mut groups, "if_standby_priority", |entry, values| {
        entry.priority = number(take(values, "priority"));
    });
    update_groups(query, &mut groups, "if_standby_preempt", |entry, values| {
        entry.preempt = take(values, "preempt").is_some();
    });
    update_groups(query, &mut groups, "if_standby_authentication", |entry, values| {
        if let (Some(authentication_type), Some(key_type), Some(key_string)) = (
            take(values, "authentication_type"),
            take(values, "key_type"),
            take(values, "key_string"),
        ) {
            entry.authentication = Some(StandbyAuthentication {
                authentication_type,
                key_type,
                key_string,
            });
        }
    });

    let version = if query.has_child("if_standby_version") { 2 } else { 1 };
    Some(Standby { version, groups })
}

/// Apply `feature` matches to groups that already have a virtual address.
fn update_groups(
    query: &LineQuery<'_>,
    groups: &mut BTreeMap<u32, StandbyGroup>,
    feature: &str,
    apply: impl Fn(&mut StandbyGroup, &mut GroupMap),
) {
    for mut values in query.child_maps(feature) {
        let Some(group) = number(take(&mut values, "standby_group")) else {
            continue;
        };
        if let Some(entry) = groups.get_mut(&group) {
            apply(entry, &mut values);
        }
    }
}

fn unprocessed(lookup: &Lookup<'_>, line: LineRef<'_>) -> Vec<String> {
    let consumed: Vec<&Pattern> = CONSUMED_FEATURES
        .iter()
        .filter_map(|feature| lookup.dialect.table().get(feature))
        .collect();
    line.children()
        .into_iter()
        .filter(|child| {
            !consumed
                .iter()
                .any(|pattern| pattern.regex().is_match(child.text()))
        })
        .map(|child| child.text().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use ccparse_core::ConfigDocument;
    use pretty_assertions::assert_eq;

    use super::{extract_all, AllowedVlans, PortMode};
    use crate::dialect::Dialect;

    const CONFIG: &str = "\
interface GigabitEthernet0/1
 description Server
 switchport mode trunk
 switchport trunk allowed vlan 10,20-22
 switchport trunk allowed vlan add 23,30
 no cdp enable
 spanning-tree bpduguard enable
!
interface Vlan10
 ip address 10.0.0.2 255.255.255.0
 standby 1 ip 10.0.0.1
 standby 1 priority 120
 standby 1 preempt
";

    #[test]
    fn trunk_allowed_vlans_are_joined_and_compressed() {
        let doc = ConfigDocument::from_text(CONFIG);
        let dialect = Dialect::ios().expect("dialect");
        let interfaces = extract_all(&doc, &dialect, true);
        let gi = &interfaces[0];

        assert_eq!(gi.name, "GigabitEthernet0/1");
        assert_eq!(gi.short_name, "Gi0/1");
        assert_eq!(gi.port_mode, PortMode::L2);
        assert_eq!(
            gi.trunk_allowed_vlans,
            Some(AllowedVlans::List(vec![
                "10".to_string(),
                "20-23".to_string(),
                "30".to_string()
            ]))
        );
        assert!(!gi.cdp);
        assert_eq!(gi.unprocessed, vec![" spanning-tree bpduguard enable"]);
    }

    #[test]
    fn svi_reports_l3_and_standby() {
        let doc = ConfigDocument::from_text(CONFIG);
        let dialect = Dialect::ios().expect("dialect");
        let interfaces = extract_all(&doc, &dialect, false);
        let svi = &interfaces[1];

        assert_eq!(svi.port_mode, PortMode::L3);
        assert!(!svi.cdp);
        assert_eq!(svi.ip_addresses.len(), 1);
        let standby = svi.standby.as_ref().expect("standby");
        assert_eq!(standby.version, 1);
        let group = &standby.groups[&1];
        assert_eq!(group.priority, Some(120));
        assert!(group.preempt);
        assert_eq!(group.ip_addresses[0].ip_address, "10.0.0.1");
        assert!(svi.unprocessed.is_empty());
    }
}
