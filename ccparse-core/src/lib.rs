//! Line-tree model and query engine for Cisco IOS-style configuration text.
//!
//! Raw text is normalized into a [`ConfigDocument`] whose structure is derived
//! from indentation. Regex queries run against single lines, against the
//! children of a line, or against the whole document. [`CiscoRange`] expands
//! and compresses range expressions such as `Gi0/1-3,Gi0/5` or `10,20-22`.

pub mod document;
pub mod logging;
pub mod normalize;
pub mod pattern;
pub mod query;
pub mod range;
pub mod table;

pub use document::{ConfigDocument, ConfigLine, LineKind, LineRef, Markers, ParseOptions, ResultMode};
pub use logging::{FacadeSink, Level, LogEntry, LogSink, Logger, MemorySink};
pub use normalize::{fix_indents, trim_to_markers};
pub use pattern::{GroupMap, Pattern, PatternError};
pub use query::{Extracted, FieldConflict, Group, SectionEntry};
pub use range::{compress_tokens, CiscoRange, NamedToken, RangeError, RangeItem, RangeToken};
pub use table::{LineQuery, PatternTable, TableError};
