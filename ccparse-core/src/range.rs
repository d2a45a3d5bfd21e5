//! Cisco-style range lists such as `"10,20-22"` or `"Gi0/1-3,Gi0/5"`.
//!
//! A [`CiscoRange`] holds the expanded, canonically ordered token list and the
//! compressed notation derived from it. Every mutation re-sorts and
//! re-compresses from scratch.
//!
//! ## Ordering
//!
//! Numeric lists sort by value. Named lists sort by slot-path depth first
//! (`Gi0` before `Gi0/1`), then by slot components, channel and sub-interface.
//! The prefix does not participate in the ordering; ties keep insertion order.
//!
//! ## Compression
//!
//! Consecutive ports under the same prefix and slot collapse into `A-B`.
//! Unprefixed lists follow the Cisco VLAN convention: a run of exactly two
//! values is written as two singletons (`5,6`), never `5-6`. Named lists always
//! use `A-B` once two ports are consecutive. Tokens carrying a sub-interface or
//! channel are never compressed and are emitted as soon as they are seen.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::ops::Index;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::logging::Logger;

static RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*-\s*\d+").expect("range regex is valid"));

static SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<path>(?:\d+/)*)(?P<first>\d+)(?:\s*-\s*(?P<last>\d+))?(?::(?P<channel>\d+))?(?:\.(?P<sub>\d+))?$",
    )
    .expect("suffix regex is valid")
});

/// Errors raised for malformed range expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Range start is greater than its stop.
    #[error("invalid range '{item}': start {start} is bigger than stop {stop}")]
    InvalidRange { item: String, start: u32, stop: u32 },
    /// A range was combined with a sub-interface or channel suffix.
    #[error("sub-interfaces and channels cannot be combined with ranges: '{item}'")]
    RangeWithSuffix { item: String },
    /// Prefixed and unprefixed values were mixed.
    #[error("cannot mix prefixed and un-prefixed values")]
    MixedPrefix,
    /// Item is neither a number, a numeric range nor a prefixed identifier.
    #[error("unrecognized range item '{item}'")]
    InvalidItem { item: String },
    /// A numeric component does not fit into 32 bits.
    #[error("number out of range in '{item}'")]
    NumberOverflow { item: String },
}

/// Interface-style token: `prefix` + slot path + optional channel and sub-interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedToken {
    pub prefix: String,
    /// Slash-separated numbers, the last one being the port. Never empty.
    pub slot_path: Vec<u32>,
    pub sub_interface: Option<u32>,
    pub channel: Option<u32>,
}

impl NamedToken {
    /// Prefix plus every slot component except the port, e.g. `Gi1/0/` for `Gi1/0/5`.
    pub fn prefix_slot(&self) -> String {
        let mut out = self.prefix.clone();
        if let Some((_, slots)) = self.slot_path.split_last() {
            for slot in slots {
                out.push_str(&slot.to_string());
                out.push('/');
            }
        }
        out
    }

    /// Last slot component.
    pub fn port(&self) -> u32 {
        self.slot_path.last().copied().unwrap_or_default()
    }

    fn is_compressible(&self) -> bool {
        self.sub_interface.is_none() && self.channel.is_none()
    }
}

impl Display for NamedToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        for (idx, slot) in self.slot_path.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{slot}")?;
        }
        if let Some(channel) = self.channel {
            write!(f, ":{channel}")?;
        }
        if let Some(sub) = self.sub_interface {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

/// One discrete element of a range list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeToken {
    /// Bare integer (VLAN ids, keys).
    Numeric(u32),
    /// Prefixed identifier (interface names).
    Named(NamedToken),
}

impl RangeToken {
    pub fn is_named(&self) -> bool {
        matches!(self, RangeToken::Named(_))
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            RangeToken::Numeric(value) => Some(*value),
            RangeToken::Named(_) => None,
        }
    }
}

impl Display for RangeToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RangeToken::Numeric(value) => write!(f, "{value}"),
            RangeToken::Named(named) => named.fmt(f),
        }
    }
}

impl Serialize for RangeToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Input element accepted by [`CiscoRange::from_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeItem {
    /// A range expression, possibly holding several comma-separated items.
    Text(String),
    Number(u32),
}

impl From<&str> for RangeItem {
    fn from(value: &str) -> Self {
        RangeItem::Text(value.to_string())
    }
}

impl From<String> for RangeItem {
    fn from(value: String) -> Self {
        RangeItem::Text(value)
    }
}

impl From<u32> for RangeItem {
    fn from(value: u32) -> Self {
        RangeItem::Number(value)
    }
}

/// Ordered, de-duplicated set of range tokens with its compressed notation.
#[derive(Debug, Clone)]
pub struct CiscoRange {
    tokens: Vec<RangeToken>,
    compressed: Vec<String>,
    logger: Logger,
}

impl CiscoRange {
    /// Expand a comma-separated range expression.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        Self::parse_with_logger(text, Logger::new("ccparse_core::range"))
    }

    pub fn parse_with_logger(text: &str, logger: Logger) -> Result<Self, RangeError> {
        Self::from_items_with_logger([text], logger)
    }

    /// Expand a list of expressions and bare numbers.
    pub fn from_items<I, T>(items: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<RangeItem>,
    {
        Self::from_items_with_logger(items, Logger::new("ccparse_core::range"))
    }

    pub fn from_items_with_logger<I, T>(items: I, logger: Logger) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<RangeItem>,
    {
        let tokens = expand_items(items, &logger)?;
        let tokens = sort_tokens(tokens);
        let compressed = compress_tokens(&tokens);
        logger.debug(format_args!("compressed range: {}", compressed.join(",")));
        Ok(Self {
            tokens,
            compressed,
            logger,
        })
    }

    /// Empty range.
    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            compressed: Vec::new(),
            logger: Logger::new("ccparse_core::range"),
        }
    }

    /// Expanded tokens in canonical order.
    pub fn tokens(&self) -> &[RangeToken] {
        &self.tokens
    }

    /// Expanded tokens rendered as strings.
    pub fn expanded(&self) -> Vec<String> {
        self.tokens.iter().map(ToString::to_string).collect()
    }

    /// Minimal range notation, one entry per run or standalone token.
    pub fn compressed(&self) -> &[String] {
        &self.compressed
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RangeToken> {
        self.tokens.iter()
    }

    pub fn contains(&self, token: &RangeToken) -> bool {
        self.tokens.contains(token)
    }

    /// True when the tokens are prefixed identifiers.
    pub fn is_named(&self) -> bool {
        self.tokens.iter().any(RangeToken::is_named)
    }

    /// Merge more items into the range.
    pub fn add<I, T>(&mut self, items: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<RangeItem>,
    {
        let incoming = expand_items(items, &self.logger)?;
        self.ensure_same_kind(&incoming)?;
        let mut merged = std::mem::take(&mut self.tokens);
        merged.extend(incoming);
        self.rebuild(dedup(merged));
        Ok(())
    }

    /// Drop items from the range. Items not present are ignored.
    pub fn remove<I, T>(&mut self, items: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<RangeItem>,
    {
        let outgoing = expand_items(items, &self.logger)?;
        self.ensure_same_kind(&outgoing)?;
        let outgoing: HashSet<RangeToken> = outgoing.into_iter().collect();
        let kept = std::mem::take(&mut self.tokens)
            .into_iter()
            .filter(|token| !outgoing.contains(token))
            .collect();
        self.rebuild(kept);
        Ok(())
    }

    /// Tokens present in `self` but not in `other`.
    pub fn difference(&self, other: &CiscoRange) -> CiscoRange {
        let theirs: HashSet<&RangeToken> = other.tokens.iter().collect();
        let tokens = self
            .tokens
            .iter()
            .filter(|token| !theirs.contains(token))
            .cloned()
            .collect();
        self.derived(tokens)
    }

    /// Tokens present in either range.
    pub fn union(&self, other: &CiscoRange) -> Result<CiscoRange, RangeError> {
        self.ensure_same_kind(&other.tokens)?;
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        Ok(self.derived(dedup(tokens)))
    }

    /// Tokens present in exactly one of the ranges.
    pub fn symmetric_difference(&self, other: &CiscoRange) -> Result<CiscoRange, RangeError> {
        self.ensure_same_kind(&other.tokens)?;
        let ours: HashSet<&RangeToken> = self.tokens.iter().collect();
        let theirs: HashSet<&RangeToken> = other.tokens.iter().collect();
        let tokens = self
            .tokens
            .iter()
            .filter(|token| !theirs.contains(token))
            .chain(other.tokens.iter().filter(|token| !ours.contains(token)))
            .cloned()
            .collect();
        Ok(self.derived(tokens))
    }

    fn ensure_same_kind(&self, incoming: &[RangeToken]) -> Result<(), RangeError> {
        if self.tokens.is_empty() || incoming.is_empty() {
            return Ok(());
        }
        if self.is_named() != incoming.iter().any(RangeToken::is_named) {
            self.logger
                .error(format_args!("cannot merge prefixed and un-prefixed values"));
            return Err(RangeError::MixedPrefix);
        }
        Ok(())
    }

    fn rebuild(&mut self, tokens: Vec<RangeToken>) {
        self.tokens = sort_tokens(tokens);
        self.compressed = compress_tokens(&self.tokens);
    }

    fn derived(&self, tokens: Vec<RangeToken>) -> CiscoRange {
        let mut out = CiscoRange {
            tokens: Vec::new(),
            compressed: Vec::new(),
            logger: self.logger.clone(),
        };
        out.rebuild(tokens);
        out
    }
}

impl Default for CiscoRange {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for CiscoRange {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for CiscoRange {}

impl Display for CiscoRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compressed.join(","))
    }
}

impl FromStr for CiscoRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CiscoRange::parse(s)
    }
}

impl Index<usize> for CiscoRange {
    type Output = RangeToken;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a CiscoRange {
    type Item = &'a RangeToken;
    type IntoIter = std::slice::Iter<'a, RangeToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

fn split_items<I, T>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<RangeItem>,
{
    let mut out = Vec::new();
    for item in items {
        match item.into() {
            RangeItem::Number(value) => out.push(value.to_string()),
            RangeItem::Text(text) => out.extend(
                text.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(ToString::to_string),
            ),
        }
    }
    out
}

/// Split an item into its leading letters and the remainder.
fn split_prefix(item: &str) -> (&str, &str) {
    let end = item
        .char_indices()
        .find(|(idx, c)| !(c.is_ascii_alphabetic() || (*c == '-' && *idx > 0)))
        .map(|(idx, _)| idx)
        .unwrap_or(item.len());
    item.split_at(end)
}

fn has_prefix(item: &str) -> bool {
    let (prefix, rest) = split_prefix(item);
    !prefix.is_empty() && rest.starts_with(|c: char| c.is_ascii_digit())
}

fn expand_items<I, T>(items: I, logger: &Logger) -> Result<Vec<RangeToken>, RangeError>
where
    I: IntoIterator<Item = T>,
    T: Into<RangeItem>,
{
    let raw = split_items(items);
    logger.debug(format_args!("raw range items: {raw:?}"));

    let prefixed = raw.iter().filter(|item| has_prefix(item)).count();
    if prefixed > 0 && prefixed != raw.len() {
        logger.error(format_args!("found prefix inconsistency in {raw:?}"));
        return Err(RangeError::MixedPrefix);
    }

    let mut tokens = Vec::new();
    for item in &raw {
        match expand_item(item) {
            Ok(expanded) => tokens.extend(expanded),
            Err(err) => {
                logger.error(format_args!("{err}"));
                return Err(err);
            }
        }
    }
    Ok(dedup(tokens))
}

fn expand_item(item: &str) -> Result<Vec<RangeToken>, RangeError> {
    let invalid = || RangeError::InvalidItem {
        item: item.to_string(),
    };
    let (prefix, suffix) = split_prefix(item);
    if !suffix.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let has_range = RANGE_REGEX.is_match(suffix);
    if has_range && (suffix.contains('.') || suffix.contains(':')) {
        return Err(RangeError::RangeWithSuffix {
            item: item.to_string(),
        });
    }

    let caps = SUFFIX_REGEX.captures(suffix).ok_or_else(invalid)?;
    let number = |name: &str| -> Result<Option<u32>, RangeError> {
        caps.name(name)
            .map(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| RangeError::NumberOverflow {
                        item: item.to_string(),
                    })
            })
            .transpose()
    };

    let mut base_path = Vec::new();
    if let Some(path) = caps.name("path") {
        for slot in path.as_str().split('/').filter(|s| !s.is_empty()) {
            base_path.push(slot.parse::<u32>().map_err(|_| RangeError::NumberOverflow {
                item: item.to_string(),
            })?);
        }
    }
    let first = number("first")?.ok_or_else(invalid)?;
    let last = number("last")?;
    let channel = number("channel")?;
    let sub_interface = number("sub")?;

    if prefix.is_empty() && (!base_path.is_empty() || channel.is_some() || sub_interface.is_some())
    {
        return Err(invalid());
    }

    let build = |port: u32| -> RangeToken {
        if prefix.is_empty() {
            return RangeToken::Numeric(port);
        }
        let mut slot_path = base_path.clone();
        slot_path.push(port);
        RangeToken::Named(NamedToken {
            prefix: prefix.to_string(),
            slot_path,
            sub_interface,
            channel,
        })
    };

    match last {
        Some(stop) if first > stop => Err(RangeError::InvalidRange {
            item: item.to_string(),
            start: first,
            stop,
        }),
        Some(stop) => Ok((first..=stop).map(build).collect()),
        None => Ok(vec![build(first)]),
    }
}

fn dedup(tokens: Vec<RangeToken>) -> Vec<RangeToken> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Canonical order; see the module docs.
fn sort_tokens(mut tokens: Vec<RangeToken>) -> Vec<RangeToken> {
    tokens.sort_by(|a, b| match (a, b) {
        (RangeToken::Numeric(x), RangeToken::Numeric(y)) => x.cmp(y),
        (RangeToken::Named(x), RangeToken::Named(y)) => x
            .slot_path
            .len()
            .cmp(&y.slot_path.len())
            .then_with(|| x.slot_path.cmp(&y.slot_path))
            .then_with(|| x.channel.cmp(&y.channel))
            .then_with(|| x.sub_interface.cmp(&y.sub_interface)),
        (RangeToken::Numeric(_), RangeToken::Named(_)) => std::cmp::Ordering::Less,
        (RangeToken::Named(_), RangeToken::Numeric(_)) => std::cmp::Ordering::Greater,
    });
    tokens
}

struct Run {
    prefix: String,
    start: u32,
    end: u32,
}

impl Run {
    fn flush(self, out: &mut Vec<String>) {
        if self.start == self.end {
            out.push(format!("{}{}", self.prefix, self.start));
        } else if self.prefix.is_empty() && self.end == self.start + 1 {
            out.push(self.start.to_string());
            out.push(self.end.to_string());
        } else {
            out.push(format!("{}{}-{}", self.prefix, self.start, self.end));
        }
    }
}

/// Compress sorted tokens into minimal notation; see the module docs.
pub fn compress_tokens(tokens: &[RangeToken]) -> Vec<String> {
    let mut out = Vec::new();
    let mut run: Option<Run> = None;

    for token in tokens {
        let (prefix, number) = match token {
            RangeToken::Numeric(value) => (String::new(), *value),
            RangeToken::Named(named) if !named.is_compressible() => {
                out.push(named.to_string());
                continue;
            }
            RangeToken::Named(named) => (named.prefix_slot(), named.port()),
        };

        match run.as_mut() {
            Some(current)
                if current.prefix == prefix && current.end.checked_add(1) == Some(number) =>
            {
                current.end = number;
            }
            _ => {
                if let Some(done) = run.take() {
                    done.flush(&mut out);
                }
                run = Some(Run {
                    prefix,
                    start: number,
                    end: number,
                });
            }
        }
    }

    if let Some(done) = run {
        done.flush(&mut out);
    }
    out
}
