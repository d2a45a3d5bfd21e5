//! Indentation repair and dump trimming.
//!
//! Device dumps are not consistent about how many spaces make one nesting level.
//! [`fix_indents`] rewrites every line so that its indent equals its nesting
//! depth, moving at most one level per line relative to the previous one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default start marker of a configuration dump.
pub static VERSION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^version \d+\.\d+").expect("version marker is valid"));

/// Default end marker of a configuration dump.
pub static END_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^end\s*$").expect("end marker is valid"));

/// Number of leading space characters.
pub fn raw_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Canonical indent of every line, computed from raw indents.
///
/// A line at raw indent 0 is always top level. Otherwise the level follows the
/// previous line: same raw indent keeps the level, a deeper one adds exactly one
/// level and a shallower one removes exactly one level. The running level may
/// drop below 0 and is carried as such; only the returned indents are clamped.
pub fn fixed_indent_map(raw: &[usize]) -> Vec<usize> {
    let mut levels: Vec<isize> = Vec::with_capacity(raw.len());
    for (idx, &indent) in raw.iter().enumerate() {
        let level = match levels.last() {
            None => 0,
            Some(_) if indent == 0 => 0,
            Some(&prev) => {
                let prev_raw = raw[idx - 1];
                if indent == prev_raw {
                    prev
                } else if indent > prev_raw {
                    prev + 1
                } else {
                    prev - 1
                }
            }
        };
        levels.push(level);
    }
    levels
        .into_iter()
        .map(|level| level.max(0) as usize)
        .collect()
}

/// Rewrite lines into the canonical one-space-per-level scheme.
pub fn fix_indents<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let raw: Vec<usize> = lines.iter().map(|line| raw_indent(line.as_ref())).collect();
    fixed_indent_map(&raw)
        .into_iter()
        .zip(lines)
        .map(|(level, line)| format!("{}{}", " ".repeat(level), line.as_ref().trim()))
        .collect()
}

/// Keep the lines from the first `start` match through the first `end` match
/// after it, both inclusive. `None` when either marker is missing.
pub fn trim_to_markers<'a>(lines: &[&'a str], start: &Regex, end: &Regex) -> Option<Vec<&'a str>> {
    let first = lines.iter().position(|line| start.is_match(line))?;
    let last = lines[first..]
        .iter()
        .position(|line| end.is_match(line))
        .map(|offset| first + offset)?;
    Some(lines[first..=last].to_vec())
}
