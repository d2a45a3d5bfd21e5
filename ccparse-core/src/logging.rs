//! Injected logging capability.
//!
//! Components never reach for a global logger directly. Each one is handed a
//! [`Logger`] at construction, which pairs a target name with a shared
//! [`LogSink`]. The default sink forwards to the `log` facade, so a binary only
//! has to install a facade backend once at program entry.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex};

pub use log::Level;

/// Destination for diagnostic records emitted by core components.
pub trait LogSink: Send + Sync {
    /// Emit one record for `target` at `level`.
    fn emit(&self, level: Level, target: &str, args: fmt::Arguments<'_>);
}

/// Sink that forwards every record to the `log` crate macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn emit(&self, level: Level, target: &str, args: fmt::Arguments<'_>) {
        log::log!(target: target, level, "{}", args);
    }
}

/// One record captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Sink that keeps records in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records captured so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Records at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, target: &str, args: fmt::Arguments<'_>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                target: target.to_string(),
                message: args.to_string(),
            });
        }
    }
}

/// Cheap, cloneable handle used by components to report diagnostics.
#[derive(Clone)]
pub struct Logger {
    target: Cow<'static, str>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Logger that forwards to the `log` facade under `target`.
    pub fn new(target: impl Into<Cow<'static, str>>) -> Self {
        Self::with_sink(target, Arc::new(FacadeSink))
    }

    /// Logger writing to a caller-provided sink.
    pub fn with_sink(target: impl Into<Cow<'static, str>>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            target: target.into(),
            sink,
        }
    }

    /// Logger sharing this logger's sink under a different target.
    pub fn scoped(&self, target: impl Into<Cow<'static, str>>) -> Self {
        Self {
            target: target.into(),
            sink: Arc::clone(&self.sink),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.sink.emit(level, &self.target, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("ccparse_core")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Level, Logger, MemorySink};

    #[test]
    fn scoped_logger_shares_sink() {
        let sink = Arc::new(MemorySink::new());
        let root = Logger::with_sink("root", sink.clone());
        let child = root.scoped("root::child");

        root.info(format_args!("loaded {} lines", 3));
        child.warn(format_args!("conflict"));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].target, "root");
        assert_eq!(entries[0].message, "loaded 3 lines");
        assert_eq!(entries[1].target, "root::child");
        assert_eq!(sink.at_level(Level::Warn).len(), 1);
    }
}
