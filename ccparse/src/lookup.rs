use ccparse_core::{CiscoRange, ConfigDocument, Group, GroupMap, LineQuery, LineRef, Pattern};

use crate::dialect::Dialect;

/// Feature-name lookups of one document through one dialect.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lookup<'a> {
    pub doc: &'a ConfigDocument,
    pub dialect: &'a Dialect,
}

impl<'a> Lookup<'a> {
    pub fn new(doc: &'a ConfigDocument, dialect: &'a Dialect) -> Self {
        Self { doc, dialect }
    }

    pub fn pattern(&self, feature: &str) -> Option<&'a Pattern> {
        let pattern = self.dialect.table().get(feature);
        if pattern.is_none() {
            self.doc.logger().error(format_args!(
                "dialect '{}' has no pattern '{}'",
                self.dialect.name(),
                feature
            ));
        }
        pattern
    }

    pub fn patterns(&self, features: &[&str]) -> Vec<&'a Pattern> {
        features
            .iter()
            .filter_map(|feature| self.pattern(feature))
            .collect()
    }

    pub fn find(&self, feature: &str) -> Vec<LineRef<'a>> {
        self.pattern(feature)
            .map(|pattern| self.doc.find_objects(pattern))
            .unwrap_or_default()
    }

    pub fn on(&self, line: LineRef<'a>) -> LineQuery<'a> {
        self.dialect.table().on(line)
    }

    /// `group` of the first line matching `feature`.
    pub fn first_value(&self, feature: &str, group: impl Into<Group>) -> Option<String> {
        let line = self.find(feature).into_iter().next()?;
        self.on(line).value(feature, group)
    }

    pub fn autoparse(&self, candidate: &str, features: &[&str]) -> Vec<GroupMap> {
        match self.pattern(candidate) {
            Some(candidate) => self
                .doc
                .property_autoparse(candidate, &self.patterns(features)),
            None => Vec::new(),
        }
    }

    /// Parse a range expression, logging instead of failing.
    pub fn range(&self, text: &str) -> Option<CiscoRange> {
        match CiscoRange::parse_with_logger(text, self.doc.logger().scoped("ccparse::range")) {
            Ok(range) => Some(range),
            Err(err) => {
                self.doc
                    .logger()
                    .warn(format_args!("ignoring range '{text}': {err}"));
                None
            }
        }
    }
}

/// Remove `key` from `map`, flattening non-participating groups.
pub(crate) fn take(map: &mut GroupMap, key: &str) -> Option<String> {
    map.remove(key).flatten()
}
