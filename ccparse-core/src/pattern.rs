use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use regex::{Captures, Regex};
use thiserror::Error;

/// Named capture values of one match. `None` marks a group that did not
/// participate in the match.
pub type GroupMap = BTreeMap<String, Option<String>>;

/// A regex that failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compiled regex plus its named groups, resolved once at construction.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    named: Vec<(String, usize)>,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source).map_err(|source_err| PatternError {
            pattern: source.to_string(),
            source: source_err,
        })?;
        let named = regex
            .capture_names()
            .enumerate()
            .filter_map(|(idx, name)| name.map(|name| (name.to_string(), idx)))
            .collect();
        Ok(Self { regex, named })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of capture groups, not counting the implicit whole-match group.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Named groups in declaration order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.named.iter().map(|(name, _)| name.as_str())
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.named
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, idx)| *idx)
    }

    /// Every named group mapped to `None`.
    pub fn empty_groups(&self) -> GroupMap {
        self.group_names()
            .map(|name| (name.to_string(), None))
            .collect()
    }

    /// Named group values of a match produced by this pattern.
    pub fn group_map(&self, caps: &Captures<'_>) -> GroupMap {
        self.named
            .iter()
            .map(|(name, idx)| (name.clone(), caps.get(*idx).map(|m| m.as_str().to_string())))
            .collect()
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Pattern {
    type Error = PatternError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Pattern::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn resolves_named_groups_once() {
        let pattern = Pattern::new(r"^ ip address (?P<ip>\S+) (\S+)(?: (?P<secondary>secondary))?")
            .expect("pattern");
        assert_eq!(pattern.group_count(), 3);
        assert_eq!(pattern.group_names().collect::<Vec<_>>(), vec!["ip", "secondary"]);
        assert_eq!(pattern.group_index("secondary"), Some(3));
        assert_eq!(pattern.group_index("mask"), None);
    }

    #[test]
    fn group_map_marks_missing_branches() {
        let pattern =
            Pattern::new(r"^ ip address (?P<ip>\S+) (?P<mask>\S+)(?: (?P<secondary>secondary))?")
                .expect("pattern");
        let caps = pattern
            .regex()
            .captures(" ip address 10.0.0.1 255.255.255.0")
            .expect("match");
        let map = pattern.group_map(&caps);
        assert_eq!(map["ip"].as_deref(), Some("10.0.0.1"));
        assert_eq!(map["secondary"], None);
    }

    #[test]
    fn invalid_regex_reports_source() {
        let err = Pattern::new("(unclosed").expect_err("invalid");
        assert_eq!(err.pattern, "(unclosed");
    }
}
