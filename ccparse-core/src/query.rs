//! Regex queries over the line tree.
//!
//! Every query follows the same miss policy: a pattern that does not match, or
//! a group the pattern does not define, is logged through the document's
//! [`Logger`](crate::Logger) and reported as `None` or an empty collection.

use std::fmt::{self, Display, Formatter};

use regex::Captures;
use serde::Serialize;

use crate::document::{ConfigDocument, LineRef, ResultMode};
use crate::pattern::{GroupMap, Pattern};

/// Which part of a match to extract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    /// Positional group, `0` being the whole match.
    Index(usize),
    Name(String),
    /// Every named group of the pattern.
    All,
}

impl From<usize> for Group {
    fn from(value: usize) -> Self {
        Group::Index(value)
    }
}

impl From<&str> for Group {
    fn from(value: &str) -> Self {
        if value == "ALL" {
            Group::All
        } else {
            Group::Name(value.to_string())
        }
    }
}

impl From<String> for Group {
    fn from(value: String) -> Self {
        Group::from(value.as_str())
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Group::Index(idx) => write!(f, "{idx}"),
            Group::Name(name) => f.write_str(name),
            Group::All => f.write_str("ALL"),
        }
    }
}

/// Result of a group extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    /// A single group; `None` when the group did not participate in the match.
    Value(Option<String>),
    Groups(GroupMap),
}

impl Extracted {
    pub fn value(&self) -> Option<&str> {
        match self {
            Extracted::Value(value) => value.as_deref(),
            Extracted::Groups(_) => None,
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Extracted::Value(value) => value,
            Extracted::Groups(_) => None,
        }
    }

    pub fn into_groups(self) -> Option<GroupMap> {
        match self {
            Extracted::Groups(groups) => Some(groups),
            Extracted::Value(_) => None,
        }
    }
}

/// A field pattern that matched more than one child of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConflict {
    pub pattern: String,
    pub matches: usize,
}

/// Merged values of one section, keyed by group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    /// Index of the section's parent line.
    pub line: usize,
    pub values: GroupMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<FieldConflict>,
}

impl SectionEntry {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|value| value.as_deref())
    }
}

fn has_group(pattern: &Pattern, group: &Group) -> bool {
    match group {
        Group::Index(idx) => *idx <= pattern.group_count(),
        Group::Name(name) => pattern.group_index(name).is_some(),
        Group::All => true,
    }
}

fn extract(pattern: &Pattern, caps: &Captures<'_>, group: &Group) -> Extracted {
    let positional = |idx: usize| caps.get(idx).map(|m| m.as_str().to_string());
    match group {
        Group::Index(idx) => Extracted::Value(positional(*idx)),
        Group::Name(name) => Extracted::Value(pattern.group_index(name).and_then(positional)),
        Group::All => Extracted::Groups(pattern.group_map(caps)),
    }
}

impl<'a> LineRef<'a> {
    /// Text of the first match anywhere in the line.
    pub fn search(&self, pattern: &Pattern) -> Option<&'a str> {
        let found = pattern.regex().find(self.text()).map(|m| m.as_str());
        if found.is_none() {
            self.log_miss(pattern);
        }
        found
    }

    /// Like [`search`](Self::search), extracting `group` from the match.
    pub fn search_group(&self, pattern: &Pattern, group: impl Into<Group>) -> Option<Extracted> {
        let group = group.into();
        if !self.check_group(pattern, &group) {
            return None;
        }
        let Some(caps) = pattern.regex().captures(self.text()) else {
            self.log_miss(pattern);
            return None;
        };
        Some(extract(pattern, &caps, &group))
    }

    /// Text of a match starting at the beginning of the line.
    pub fn match_text(&self, pattern: &Pattern) -> Option<&'a str> {
        let found = pattern
            .regex()
            .find(self.text())
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str());
        if found.is_none() {
            self.log_miss(pattern);
        }
        found
    }

    /// Like [`match_text`](Self::match_text), extracting `group` from the match.
    pub fn match_group(&self, pattern: &Pattern, group: impl Into<Group>) -> Option<Extracted> {
        let group = group.into();
        if !self.check_group(pattern, &group) {
            return None;
        }
        let caps = pattern
            .regex()
            .captures(self.text())
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0));
        let Some(caps) = caps else {
            self.log_miss(pattern);
            return None;
        };
        Some(extract(pattern, &caps, &group))
    }

    /// Single-value shorthand for [`search_group`](Self::search_group).
    pub fn search_value(&self, pattern: &Pattern, group: impl Into<Group>) -> Option<String> {
        self.search_group(pattern, group)
            .and_then(Extracted::into_value)
    }

    /// All named groups of the first match.
    pub fn search_all(&self, pattern: &Pattern) -> Option<GroupMap> {
        self.search_group(pattern, Group::All)
            .and_then(Extracted::into_groups)
    }

    /// Children whose text matches `pattern` anywhere.
    pub fn search_children(&self, pattern: &Pattern) -> Vec<LineRef<'a>> {
        let matched: Vec<LineRef<'a>> = self
            .children()
            .into_iter()
            .filter(|child| pattern.regex().is_match(child.text()))
            .collect();
        if matched.is_empty() {
            self.document().logger().debug(format_args!(
                "no children of line {} matched '{}'",
                self.index(),
                pattern
            ));
        }
        matched
    }

    /// Extract `group` from every matching child.
    pub fn search_children_group(&self, pattern: &Pattern, group: impl Into<Group>) -> Vec<Extracted> {
        let group = group.into();
        if !self.check_group(pattern, &group) {
            return Vec::new();
        }
        self.search_children(pattern)
            .into_iter()
            .filter_map(|child| pattern.regex().captures(child.text()))
            .map(|caps| extract(pattern, &caps, &group))
            .collect()
    }

    /// Participating values of `group` across matching children.
    pub fn search_children_values(&self, pattern: &Pattern, group: impl Into<Group>) -> Vec<String> {
        self.search_children_group(pattern, group)
            .into_iter()
            .filter_map(Extracted::into_value)
            .collect()
    }

    /// Named groups of every matching child.
    pub fn search_children_all(&self, pattern: &Pattern) -> Vec<GroupMap> {
        self.search_children_group(pattern, Group::All)
            .into_iter()
            .filter_map(Extracted::into_groups)
            .collect()
    }

    fn check_group(&self, pattern: &Pattern, group: &Group) -> bool {
        let known = has_group(pattern, group);
        if !known {
            self.document().logger().error(format_args!(
                "pattern '{}' has no group '{}'",
                pattern, group
            ));
        }
        known
    }

    fn log_miss(&self, pattern: &Pattern) {
        self.document().logger().debug(format_args!(
            "pattern '{}' did not match line {}: {:?}",
            pattern,
            self.index(),
            self.text()
        ));
    }
}

impl ConfigDocument {
    /// Lines anywhere in the document matching `pattern`.
    pub fn find_objects(&self, pattern: &Pattern) -> Vec<LineRef<'_>> {
        let matched: Vec<LineRef<'_>> = self
            .lines()
            .filter(|line| pattern.regex().is_match(line.text()))
            .collect();
        self.logger().debug(format_args!(
            "matched {} lines for '{}'",
            matched.len(),
            pattern
        ));
        matched
    }

    /// Merge the named groups of every pattern applied to `line`, later
    /// patterns overwriting earlier keys. Uses the document's result mode.
    pub fn match_to_dict(&self, line: LineRef<'_>, patterns: &[&Pattern]) -> GroupMap {
        self.match_to_dict_with(line, patterns, self.result_mode())
    }

    pub fn match_to_dict_with(
        &self,
        line: LineRef<'_>,
        patterns: &[&Pattern],
        mode: ResultMode,
    ) -> GroupMap {
        let mut merged = GroupMap::new();
        for pattern in patterns {
            match pattern.regex().captures(line.text()) {
                Some(caps) => merged.extend(pattern.group_map(&caps)),
                None if mode == ResultMode::Complete => merged.extend(pattern.empty_groups()),
                None => {}
            }
        }
        merged
    }

    /// One merged group map per line matching `candidate`.
    pub fn property_autoparse(&self, candidate: &Pattern, patterns: &[&Pattern]) -> Vec<GroupMap> {
        self.find_objects(candidate)
            .into_iter()
            .map(|line| self.match_to_dict(line, patterns))
            .collect()
    }

    /// One entry per line matching `candidate`: the candidate's own named
    /// groups merged with the groups of each field pattern found among its
    /// children.
    pub fn section_autoparse(&self, candidate: &Pattern, fields: &[&Pattern]) -> Vec<SectionEntry> {
        self.find_objects(candidate)
            .into_iter()
            .map(|line| {
                let mut entry = self.section_autoparse_line(line, fields);
                let mut values = self.match_to_dict(line, &[candidate]);
                values.append(&mut entry.values);
                entry.values = values;
                entry
            })
            .collect()
    }

    /// Section extraction for one given parent line.
    ///
    /// A field pattern matching several children keeps the first match and
    /// records a [`FieldConflict`].
    pub fn section_autoparse_line(&self, line: LineRef<'_>, fields: &[&Pattern]) -> SectionEntry {
        let mut values = GroupMap::new();
        let mut conflicts = Vec::new();
        for pattern in fields {
            let mut found = line.search_children_all(pattern);
            match found.len() {
                0 => {
                    if self.result_mode() == ResultMode::Complete {
                        values.extend(pattern.empty_groups());
                    }
                }
                1 => values.append(&mut found[0]),
                count => {
                    self.logger().warn(format_args!(
                        "{} children of line {} ({:?}) matched '{}', keeping the first",
                        count,
                        line.index(),
                        line.text(),
                        pattern
                    ));
                    conflicts.push(FieldConflict {
                        pattern: pattern.as_str().to_string(),
                        matches: count,
                    });
                    values.append(&mut found[0]);
                }
            }
        }
        SectionEntry {
            line: line.index(),
            values,
            conflicts,
        }
    }

    /// Children of the section reached by walking `parents` from the top.
    ///
    /// Each pattern is anchored at line start and must select exactly one
    /// parent line among the current section. Ambiguity or a miss is logged
    /// and yields an empty section.
    pub fn section_by_parents(&self, parents: &[&Pattern]) -> Vec<LineRef<'_>> {
        let mut section: Vec<LineRef<'_>> = self.lines().collect();
        for pattern in parents {
            let mut selected: Vec<LineRef<'_>> = section
                .iter()
                .filter(|line| line.is_parent())
                .filter(|line| {
                    pattern
                        .regex()
                        .find(line.text())
                        .is_some_and(|m| m.start() == 0)
                })
                .copied()
                .collect();
            match selected.len() {
                1 => section = selected.remove(0).children(),
                0 => {
                    self.logger().error(format_args!(
                        "no lines matched parent statement '{}'",
                        pattern
                    ));
                    return Vec::new();
                }
                count => {
                    self.logger().error(format_args!(
                        "{} lines matched parent statement '{}', cannot determine section",
                        count, pattern
                    ));
                    return Vec::new();
                }
            }
        }
        section
    }
}
