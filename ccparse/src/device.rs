//! A parsed device: one document read through one dialect, with facts
//! computed on first use.

use ccparse_core::{ConfigDocument, ResultMode};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::dialect::Dialect;
use crate::globals::{self, GlobalFacts};
use crate::interface::{self, InterfaceFacts};

#[derive(Debug)]
pub struct Device<'d> {
    doc: ConfigDocument,
    dialect: &'d Dialect,
    globals: OnceCell<GlobalFacts>,
    interfaces: OnceCell<Vec<InterfaceFacts>>,
}

/// Everything known about a device, as rendered by reports.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceFacts<'a> {
    pub dialect: &'a str,
    pub result_mode: ResultMode,
    pub lines: usize,
    pub globals: &'a GlobalFacts,
    pub interfaces: &'a [InterfaceFacts],
}

impl<'d> Device<'d> {
    pub fn new(doc: ConfigDocument, dialect: &'d Dialect) -> Self {
        Self {
            doc,
            dialect,
            globals: OnceCell::new(),
            interfaces: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.doc
    }

    pub fn dialect(&self) -> &Dialect {
        self.dialect
    }

    pub fn globals(&self) -> &GlobalFacts {
        self.globals
            .get_or_init(|| globals::extract(&self.doc, self.dialect))
    }

    pub fn interfaces(&self) -> &[InterfaceFacts] {
        self.interfaces.get_or_init(|| {
            let global_cdp = self.globals().cdp;
            interface::extract_all(&self.doc, self.dialect, global_cdp)
        })
    }

    /// Interface by long or short name, case-insensitive.
    pub fn interface(&self, name: &str) -> Option<&InterfaceFacts> {
        let long = self.dialect.interface_names().to_long(name);
        self.interfaces().iter().find(|facts| {
            facts.name.eq_ignore_ascii_case(&long) || facts.short_name.eq_ignore_ascii_case(name)
        })
    }

    pub fn facts(&self) -> DeviceFacts<'_> {
        DeviceFacts {
            dialect: self.dialect.name(),
            result_mode: self.doc.result_mode(),
            lines: self.doc.len(),
            globals: self.globals(),
            interfaces: self.interfaces(),
        }
    }
}
