//! Interface name helpers: split names and convert between long and short forms.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static INTERFACE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>[A-Za-z][A-Za-z\-]*)(?P<number>\d\S*)$")
        .expect("interface name regex is valid")
});

/// Long and abbreviated spelling of one interface type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameMapping {
    pub long: String,
    pub short: String,
}

/// Which spelling [`InterfaceNameMap::convert`] should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameForm {
    Long,
    Short,
}

/// Split `GigabitEthernet1/0/1.20` into `("GigabitEthernet", "1/0/1.20")`.
pub fn split_interface_name(name: &str) -> Option<(&str, &str)> {
    let caps = INTERFACE_NAME.captures(name.trim())?;
    Some((caps.name("prefix")?.as_str(), caps.name("number")?.as_str()))
}

/// Known interface types of a dialect.
#[derive(Debug, Clone, Default)]
pub struct InterfaceNameMap {
    mappings: Vec<NameMapping>,
}

impl InterfaceNameMap {
    pub fn new(mappings: Vec<NameMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[NameMapping] {
        &self.mappings
    }

    /// Rewrite `name` in the requested form. Names with an unknown type are
    /// returned unchanged.
    pub fn convert(&self, name: &str, form: NameForm) -> String {
        let Some((prefix, number)) = split_interface_name(name) else {
            return name.to_string();
        };
        match self.lookup(prefix) {
            Some(mapping) => {
                let prefix = match form {
                    NameForm::Long => &mapping.long,
                    NameForm::Short => &mapping.short,
                };
                format!("{prefix}{number}")
            }
            None => name.to_string(),
        }
    }

    pub fn to_short(&self, name: &str) -> String {
        self.convert(name, NameForm::Short)
    }

    pub fn to_long(&self, name: &str) -> String {
        self.convert(name, NameForm::Long)
    }

    /// Exact long or short spelling first, then an unambiguous abbreviation
    /// of a long name (`Gig` for `GigabitEthernet`).
    fn lookup(&self, prefix: &str) -> Option<&NameMapping> {
        let exact = self.mappings.iter().find(|mapping| {
            mapping.long.eq_ignore_ascii_case(prefix) || mapping.short.eq_ignore_ascii_case(prefix)
        });
        if exact.is_some() {
            return exact;
        }
        let lowered = prefix.to_ascii_lowercase();
        let mut candidates = self
            .mappings
            .iter()
            .filter(|mapping| mapping.long.to_ascii_lowercase().starts_with(&lowered));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}
