use ccparse_core::{fix_indents, CiscoRange, ConfigDocument, Pattern, RangeError, RangeItem};
use pretty_assertions::assert_eq;

const MESSY: &[&str] = &[
    "interface GigabitEthernet0/1",
    "     description five spaces",
    "  service-policy input QOS",
    "         vlan 4",
    "     load-interval 30",
    "router bgp 65000",
    "   neighbor 10.0.0.1 remote-as 65001",
    "          address-family ipv4",
    "      neighbor 10.0.0.1 activate",
    "  bgp log-neighbor-changes",
    "line vty 0 4",
];

#[test]
fn normalization_is_a_fixed_point() {
    let once = fix_indents(MESSY);
    let twice = fix_indents(&once);
    assert_eq!(once, twice);
}

#[test]
fn children_are_deeper_and_contiguous() {
    let doc = ConfigDocument::from_lines(MESSY.iter().copied());
    for line in doc.lines() {
        let children = line.children();
        for (offset, child) in children.iter().enumerate() {
            assert!(child.indent() > line.indent(), "line {} child {}", line.index(), child.index());
            assert_eq!(child.index(), line.index() + 1 + offset);
        }
    }
}

#[test]
fn is_parent_iff_children_non_empty() {
    let doc = ConfigDocument::from_lines(MESSY.iter().copied());
    for line in doc.lines() {
        assert_eq!(line.is_parent(), !line.children().is_empty(), "line {}", line.index());
    }
}

#[test]
fn compress_then_expand_preserves_tokens() {
    for expr in [
        "1,3,5-9",
        "10,15,19-22",
        "5,6",
        "Gi0/1-3,Gi0/5",
        "Fa0/3-6,Fa0/1-2",
        "Gi1/0/1,Gi1/0/2,Gi1/0/10.100",
        "Te1/1/1-4,Te1/1/2:1",
    ] {
        let first = CiscoRange::parse(expr).expect("parse");
        let again = CiscoRange::parse(&first.to_string()).expect("reparse");
        assert_eq!(first.expanded(), again.expanded(), "expression {expr}");
    }
}

#[test]
fn sort_is_deterministic() {
    let numbers = CiscoRange::parse("3,1,2").expect("parse");
    assert_eq!(numbers.expanded(), vec!["1", "2", "3"]);

    let ports = CiscoRange::parse("Fa0/3-6,Fa0/1-2").expect("parse");
    assert_eq!(
        ports.expanded(),
        vec!["Fa0/1", "Fa0/2", "Fa0/3", "Fa0/4", "Fa0/5", "Fa0/6"]
    );
}

#[test]
fn unprefixed_pairs_are_not_ranged() {
    let pair = CiscoRange::from_items([5u32, 6]).expect("pair");
    assert_eq!(pair.compressed(), ["5", "6"]);

    let triple = CiscoRange::from_items([5u32, 6, 7]).expect("triple");
    assert_eq!(triple.compressed(), ["5-7"]);
}

#[test]
fn trunk_allowed_vlans_expand_through_children() {
    let doc = ConfigDocument::from_text(
        "interface Ethernet0/0\n switchport mode trunk\n switchport trunk allowed vlan 10,20-22\n!\n",
    );
    let interface = doc.line(0).expect("interface line");
    let allowed = Pattern::new(r"switchport trunk allowed vlan (\S+)").expect("pattern");

    let values = interface.search_children_values(&allowed, 1);
    assert_eq!(values.len(), 1);

    let vlans = CiscoRange::parse(&values[0]).expect("vlan range");
    assert_eq!(vlans.expanded(), vec!["10", "20", "21", "22"]);
}

#[test]
fn descending_range_is_rejected() {
    let err = CiscoRange::parse("10-5").expect_err("start > stop");
    assert!(matches!(err, RangeError::InvalidRange { start: 10, stop: 5, .. }));
}

#[test]
fn mixed_prefix_is_rejected() {
    let err = CiscoRange::from_items([RangeItem::from("Gi0/1"), RangeItem::from("5")])
        .expect_err("mixed");
    assert_eq!(err, RangeError::MixedPrefix);
}
