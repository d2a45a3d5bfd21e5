//! Line tree over normalized configuration text.
//!
//! A [`ConfigDocument`] owns an immutable sequence of [`ConfigLine`]s. There is
//! no explicit tree: parent and child relationships are derived from indent and
//! line order, and are only ever observed through [`LineRef`] views.

use std::fmt::{self, Debug, Display, Formatter};
use std::fs;
use std::ops::Range;
use std::path::Path;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;

use crate::logging::Logger;
use crate::normalize::{fix_indents, raw_indent, trim_to_markers, END_MARKER, VERSION_MARKER};

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s+)?!").expect("comment regex is valid"));

/// What to do with the keys of a pattern that did not match while merging
/// group maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    /// Omit the keys entirely.
    #[default]
    Minimal,
    /// Keep the keys with a `None` value.
    Complete,
}

/// Start and end markers delimiting the configuration inside a device dump.
#[derive(Debug, Clone)]
pub struct Markers {
    pub start: Regex,
    pub end: Regex,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: VERSION_MARKER.clone(),
            end: END_MARKER.clone(),
        }
    }
}

/// Options applied while building a [`ConfigDocument`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub result_mode: ResultMode,
    /// Trim input to the marker range before normalizing. `None` keeps every line.
    pub markers: Option<Markers>,
}

impl ParseOptions {
    /// Options for a raw device dump: trim to the default markers.
    pub fn dump() -> Self {
        Self {
            markers: Some(Markers::default()),
            ..Self::default()
        }
    }

    pub fn with_result_mode(mut self, result_mode: ResultMode) -> Self {
        self.result_mode = result_mode;
        self
    }

    pub fn with_markers(mut self, markers: Option<Markers>) -> Self {
        self.markers = markers;
        self
    }
}

/// Structural flags of a line, computed once when the document is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineKind {
    pub parent: bool,
    pub child: bool,
    pub comment: bool,
}

/// One normalized configuration statement.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigLine {
    index: usize,
    text: String,
    indent: usize,
    kind: LineKind,
    #[serde(skip)]
    children_end: OnceCell<usize>,
}

impl ConfigLine {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }
}

/// Immutable, normalized configuration text.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDocument {
    lines: Vec<ConfigLine>,
    #[serde(skip)]
    result_mode: ResultMode,
    #[serde(skip)]
    logger: Logger,
}

impl ConfigDocument {
    /// Build from a multi-line string, keeping every non-empty line.
    pub fn from_text(text: &str) -> Self {
        Self::parse(text, &ParseOptions::default(), Logger::default())
    }

    /// Build from pre-split lines, keeping every non-empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse_lines(lines, &ParseOptions::default(), Logger::default())
    }

    /// Build from a raw device dump, trimmed to the `version`..`end` range.
    pub fn from_dump(text: &str) -> Self {
        Self::parse(text, &ParseOptions::dump(), Logger::default())
    }

    /// Read a raw device dump from disk. A missing or unreadable file is logged
    /// and yields an empty document.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::load(path, &ParseOptions::dump(), Logger::default())
    }

    pub fn parse(text: &str, options: &ParseOptions, logger: Logger) -> Self {
        Self::parse_lines(text.lines(), options, logger)
    }

    pub fn parse_lines<I, S>(lines: I, options: &ParseOptions, logger: Logger) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<String> = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let kept: Vec<&str> = owned.iter().map(String::as_str).collect();

        let kept = match &options.markers {
            None => kept,
            Some(markers) => match trim_to_markers(&kept, &markers.start, &markers.end) {
                Some(trimmed) => trimmed,
                None => {
                    logger.error(format_args!(
                        "no valid config found between markers '{}' and '{}'",
                        markers.start.as_str(),
                        markers.end.as_str()
                    ));
                    Vec::new()
                }
            },
        };

        let lines = build_lines(fix_indents(&kept));
        logger.info(format_args!("loaded {} config lines", lines.len()));
        Self {
            lines,
            result_mode: options.result_mode,
            logger,
        }
    }

    pub fn load(path: impl AsRef<Path>, options: &ParseOptions, logger: Logger) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, options, logger),
            Err(err) => {
                logger.error(format_args!(
                    "failed to read config file {}: {err}",
                    path.display()
                ));
                Self {
                    lines: Vec::new(),
                    result_mode: options.result_mode,
                    logger,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn result_mode(&self) -> ResultMode {
        self.result_mode
    }

    pub fn with_result_mode(mut self, result_mode: ResultMode) -> Self {
        self.result_mode = result_mode;
        self
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn line(&self, index: usize) -> Option<LineRef<'_>> {
        self.lines.get(index).map(|line| LineRef { doc: self, line })
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = LineRef<'_>> + ExactSizeIterator + '_ {
        self.lines.iter().map(move |line| LineRef { doc: self, line })
    }

    /// Normalized text of every line.
    pub fn lines_text(&self) -> Vec<&str> {
        self.lines.iter().map(ConfigLine::text).collect()
    }
}

impl Display for ConfigDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

fn build_lines(texts: Vec<String>) -> Vec<ConfigLine> {
    let indents: Vec<usize> = texts.iter().map(|text| raw_indent(text)).collect();
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let indent = indents[index];
            let kind = LineKind {
                parent: indents.get(index + 1).is_some_and(|next| *next > indent),
                child: indent > 0,
                comment: COMMENT.is_match(&text),
            };
            ConfigLine {
                index,
                text,
                indent,
                kind,
                children_end: OnceCell::new(),
            }
        })
        .collect()
}

/// Borrowed view of one line together with its document.
#[derive(Clone, Copy)]
pub struct LineRef<'a> {
    doc: &'a ConfigDocument,
    line: &'a ConfigLine,
}

impl<'a> LineRef<'a> {
    pub fn document(&self) -> &'a ConfigDocument {
        self.doc
    }

    pub fn line(&self) -> &'a ConfigLine {
        self.line
    }

    pub fn index(&self) -> usize {
        self.line.index
    }

    pub fn text(&self) -> &'a str {
        &self.line.text
    }

    /// Text without its indentation.
    pub fn content(&self) -> &'a str {
        self.line.text.trim_start()
    }

    pub fn indent(&self) -> usize {
        self.line.indent
    }

    pub fn kind(&self) -> LineKind {
        self.line.kind
    }

    pub fn is_parent(&self) -> bool {
        self.line.kind.parent
    }

    pub fn is_child(&self) -> bool {
        self.line.kind.child
    }

    pub fn is_comment(&self) -> bool {
        self.line.kind.comment
    }

    /// Index range of the lines nested below this one. Computed on first use.
    pub fn children_span(&self) -> Range<usize> {
        let start = self.line.index + 1;
        let end = *self.line.children_end.get_or_init(|| {
            self.doc.lines[start..]
                .iter()
                .position(|line| line.indent <= self.line.indent)
                .map_or(self.doc.lines.len(), |offset| start + offset)
        });
        start..end
    }

    /// Every line nested below this one, at any depth, in document order.
    pub fn children(&self) -> Vec<LineRef<'a>> {
        let doc = self.doc;
        doc.lines[self.children_span()]
            .iter()
            .map(|line| LineRef { doc, line })
            .collect()
    }

    /// Children exactly one level deeper.
    pub fn direct_children(&self) -> Vec<LineRef<'a>> {
        let depth = self.line.indent + 1;
        self.children()
            .into_iter()
            .filter(|child| child.indent() == depth)
            .collect()
    }

    /// Closest preceding line with a smaller indent.
    pub fn parent(&self) -> Option<LineRef<'a>> {
        if self.line.indent == 0 {
            return None;
        }
        let doc = self.doc;
        doc.lines[..self.line.index]
            .iter()
            .rev()
            .find(|line| line.indent < self.line.indent)
            .map(|line| LineRef { doc, line })
    }
}

impl PartialEq for LineRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.line.index == other.line.index
    }
}

impl Eq for LineRef<'_> {}

impl Debug for LineRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "LineRef({}: {:?})", self.line.index, self.line.text)
    }
}

impl Display for LineRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line.text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{ConfigDocument, ParseOptions};
    use crate::logging::{Level, Logger, MemorySink};

    const SAMPLE: &str = "\
interface Ethernet0/0
   description uplink
   service instance 1 ethernet
      encapsulation dot1q 10
   no shutdown
!
hostname R1
";

    #[test]
    fn builds_normalized_lines() {
        let doc = ConfigDocument::from_text(SAMPLE);
        assert_eq!(
            doc.lines_text(),
            vec![
                "interface Ethernet0/0",
                " description uplink",
                " service instance 1 ethernet",
                "  encapsulation dot1q 10",
                " no shutdown",
                "!",
                "hostname R1",
            ]
        );
        let indices: Vec<usize> = doc.lines().map(|line| line.index()).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn derives_kind_flags() {
        let doc = ConfigDocument::from_text(SAMPLE);
        let interface = doc.line(0).expect("line 0");
        assert!(interface.is_parent());
        assert!(!interface.is_child());

        let service = doc.line(2).expect("line 2");
        assert!(service.is_parent());
        assert!(service.is_child());

        let bang = doc.line(5).expect("line 5");
        assert!(bang.is_comment());
        assert!(!bang.is_parent());
        assert!(!doc.line(6).expect("line 6").is_parent());
    }

    #[test]
    fn children_are_contiguous_and_deeper() {
        let doc = ConfigDocument::from_text(SAMPLE);
        let interface = doc.line(0).expect("line 0");
        let children: Vec<&str> = interface.children().iter().map(|line| line.text()).collect();
        assert_eq!(
            children,
            vec![
                " description uplink",
                " service instance 1 ethernet",
                "  encapsulation dot1q 10",
                " no shutdown",
            ]
        );
        assert_eq!(interface.children_span(), 1..5);
        assert_eq!(interface.direct_children().len(), 3);

        let last = doc.line(6).expect("line 6");
        assert!(last.children().is_empty());
    }

    #[test]
    fn parent_is_nearest_shallower_line() {
        let doc = ConfigDocument::from_text(SAMPLE);
        let encapsulation = doc.line(3).expect("line 3");
        assert_eq!(encapsulation.parent(), doc.line(2));
        assert_eq!(doc.line(2).and_then(|line| line.parent()), doc.line(0));
        assert_eq!(doc.line(0).and_then(|line| line.parent()), None);
    }

    #[test]
    fn empty_strings_are_discarded() {
        let doc = ConfigDocument::from_lines(["hostname R1", "", "ip routing", ""]);
        assert_eq!(doc.lines_text(), vec!["hostname R1", "ip routing"]);
    }

    #[test]
    fn dump_without_markers_is_empty_and_logged() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::with_sink("test", sink.clone());
        let doc = ConfigDocument::parse("hostname R1\nend\n", &ParseOptions::dump(), logger);
        assert!(doc.is_empty());
        assert_eq!(sink.at_level(Level::Error).len(), 1);
    }

    #[test]
    fn dump_is_trimmed_to_markers() {
        let text = "show run\nBuilding configuration...\nversion 15.2\nhostname R1\nend\nR1#\n";
        let doc = ConfigDocument::from_dump(text);
        assert_eq!(doc.lines_text(), vec!["version 15.2", "hostname R1", "end"]);
    }

    #[test]
    fn display_renders_normalized_text() {
        let doc = ConfigDocument::from_lines(["router ospf 1", "    network 10.0.0.0 0.0.0.255 area 0"]);
        assert_eq!(
            doc.to_string(),
            "router ospf 1\n network 10.0.0.0 0.0.0.255 area 0\n"
        );
    }
}
