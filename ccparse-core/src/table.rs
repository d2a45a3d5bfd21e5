//! Named pattern tables and the line query bound to one.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::document::LineRef;
use crate::pattern::{GroupMap, Pattern, PatternError};
use crate::query::{Extracted, Group};

/// Errors raised while assembling a [`PatternTable`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("pattern '{name}' in table '{table}' does not compile")]
    Compile {
        table: String,
        name: String,
        #[source]
        source: PatternError,
    },
    #[error("pattern '{name}' is defined twice in table '{table}'")]
    Duplicate { table: String, name: String },
    #[error("table '{table}' has no pattern named '{name}'")]
    Missing { table: String, name: String },
}

/// Immutable mapping from feature name to compiled pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    name: String,
    patterns: BTreeMap<String, Pattern>,
}

impl PatternTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: BTreeMap::new(),
        }
    }

    /// Compile every `(feature, regex)` pair into a new table.
    pub fn compile<I, K, V>(name: impl Into<String>, entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut table = Self::new(name);
        for (feature, regex) in entries {
            table.insert(feature, regex.as_ref())?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, feature: impl Into<String>, regex: &str) -> Result<(), TableError> {
        let feature = feature.into();
        if self.patterns.contains_key(&feature) {
            return Err(TableError::Duplicate {
                table: self.name.clone(),
                name: feature,
            });
        }
        let pattern = Pattern::new(regex).map_err(|source| TableError::Compile {
            table: self.name.clone(),
            name: feature.clone(),
            source,
        })?;
        self.patterns.insert(feature, pattern);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, feature: &str) -> Option<&Pattern> {
        self.patterns.get(feature)
    }

    pub fn require(&self, feature: &str) -> Result<&Pattern, TableError> {
        self.get(feature).ok_or_else(|| TableError::Missing {
            table: self.name.clone(),
            name: feature.to_string(),
        })
    }

    /// Resolve several features at once, failing on the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, features: &[S]) -> Result<Vec<&Pattern>, TableError> {
        features
            .iter()
            .map(|feature| self.require(feature.as_ref()))
            .collect()
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Query `line` through this table.
    pub fn on<'a>(&'a self, line: LineRef<'a>) -> LineQuery<'a> {
        LineQuery { line, table: self }
    }
}

/// A line paired with the pattern table of its dialect.
///
/// Features are looked up by name; an unknown feature is logged at error level
/// and treated like a miss.
#[derive(Debug, Clone, Copy)]
pub struct LineQuery<'a> {
    line: LineRef<'a>,
    table: &'a PatternTable,
}

impl<'a> LineQuery<'a> {
    pub fn line(&self) -> LineRef<'a> {
        self.line
    }

    pub fn table(&self) -> &'a PatternTable {
        self.table
    }

    pub fn pattern(&self, feature: &str) -> Option<&'a Pattern> {
        let pattern = self.table.get(feature);
        if pattern.is_none() {
            self.line.document().logger().error(format_args!(
                "table '{}' has no pattern named '{}'",
                self.table.name(),
                feature
            ));
        }
        pattern
    }

    pub fn is_match(&self, feature: &str) -> bool {
        self.pattern(feature)
            .is_some_and(|pattern| pattern.regex().is_match(self.line.text()))
    }

    pub fn value(&self, feature: &str, group: impl Into<Group>) -> Option<String> {
        self.line.search_value(self.pattern(feature)?, group)
    }

    pub fn all(&self, feature: &str) -> Option<GroupMap> {
        self.line.search_all(self.pattern(feature)?)
    }

    pub fn children(&self, feature: &str) -> Vec<LineRef<'a>> {
        self.pattern(feature)
            .map(|pattern| self.line.search_children(pattern))
            .unwrap_or_default()
    }

    pub fn has_child(&self, feature: &str) -> bool {
        !self.children(feature).is_empty()
    }

    pub fn child_group(&self, feature: &str, group: impl Into<Group>) -> Vec<Extracted> {
        self.pattern(feature)
            .map(|pattern| self.line.search_children_group(pattern, group))
            .unwrap_or_default()
    }

    pub fn child_values(&self, feature: &str, group: impl Into<Group>) -> Vec<String> {
        self.pattern(feature)
            .map(|pattern| self.line.search_children_values(pattern, group))
            .unwrap_or_default()
    }

    /// First participating value of `group` among matching children.
    pub fn child_value(&self, feature: &str, group: impl Into<Group>) -> Option<String> {
        self.child_values(feature, group).into_iter().next()
    }

    pub fn child_maps(&self, feature: &str) -> Vec<GroupMap> {
        self.pattern(feature)
            .map(|pattern| self.line.search_children_all(pattern))
            .unwrap_or_default()
    }
}
