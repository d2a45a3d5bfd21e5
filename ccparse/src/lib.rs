//! Cisco IOS fact extraction built on the `ccparse_core` line tree.
//!
//! The core crate knows nothing about IOS: it normalizes indentation, answers
//! parent/child queries and codes range lists. This crate adds the dialect
//! (named regexes and section definitions shipped as TOML) and the extractors
//! that turn a document into global and per-interface facts.
//!
//! # Modules
//!
//! - [`dialect`]: load and validate dialect files, built-in IOS dialect
//! - [`names`]: interface name splitting and long/short conversion
//! - [`globals`]: hostname, DNS, CDP, VLANs, VRFs, NTP, logging, AAA
//! - [`interface`]: addressing, switchport, HSRP and leftover lines per interface
//! - [`device`]: a document plus dialect with lazily cached facts
//! - [`report`]: terminal and JSON rendering
//!
//! # Examples
//!
//! ```no_run
//! use ccparse::device::Device;
//! use ccparse::dialect::Dialect;
//! use ccparse_core::ConfigDocument;
//!
//! let dialect = Dialect::ios()?;
//! let device = Device::new(ConfigDocument::from_path("switch.cfg"), &dialect);
//! println!("{:?}", device.globals().hostname);
//! for interface in device.interfaces() {
//!     println!("{} {}", interface.short_name, interface.port_mode);
//! }
//! # Ok::<(), ccparse::dialect::DialectLoadError>(())
//! ```

pub mod device;
pub mod dialect;
pub mod globals;
pub mod interface;
mod lookup;
pub mod names;
pub mod report;
