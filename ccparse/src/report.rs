use ccparse_core::{Extracted, LineRef, ResultMode};
use colored::Colorize;
use serde_json::Value;

use crate::device::DeviceFacts;

/// Render lines as `index indent flags text`, one per row.
pub fn render_tree<'a>(lines: impl IntoIterator<Item = LineRef<'a>>) -> String {
    let mut out = Vec::new();
    for line in lines {
        let flags = format!(
            "{}{}{}",
            if line.is_parent() { 'P' } else { '-' },
            if line.is_child() { 'C' } else { '-' },
            if line.is_comment() { '!' } else { '-' },
        );
        let text = if line.is_comment() {
            line.text().dimmed().to_string()
        } else if line.is_parent() {
            line.text().bold().to_string()
        } else {
            line.text().to_string()
        };
        out.push(format!("{:>5} {:>2} {} {}", line.index(), line.indent(), flags, text));
    }
    out.join("\n")
}

/// Render matched lines with their document index.
pub fn render_matches(lines: &[LineRef<'_>]) -> String {
    lines
        .iter()
        .map(|line| format!("{} {}", format!("{:>5}", line.index()).cyan(), line.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render extracted group values, one per row.
pub fn render_extracted(values: &[Extracted]) -> String {
    let mut out = Vec::new();
    for value in values {
        match value {
            Extracted::Value(Some(text)) => out.push(text.clone()),
            Extracted::Value(None) => out.push("-".dimmed().to_string()),
            Extracted::Groups(groups) => {
                let row = groups
                    .iter()
                    .map(|(name, value)| format!("{name}={}", value.as_deref().unwrap_or("-")))
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push(row);
            }
        }
    }
    out.join("\n")
}

/// JSON form of the device facts. Minimal mode drops null members.
pub fn facts_json(facts: &DeviceFacts<'_>) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(facts)?;
    if facts.result_mode == ResultMode::Minimal {
        prune_nulls(&mut value);
    }
    Ok(value)
}

/// Remove null object members at any depth.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Terminal report of device facts.
pub fn render_facts_text(facts: &DeviceFacts<'_>) -> serde_json::Result<String> {
    let json = facts_json(facts)?;
    let mut out = Vec::new();

    out.push(heading("device"));
    out.push(format!("- dialect: {}", facts.dialect));
    out.push(format!("- lines: {}", facts.lines));

    if let Some(Value::Object(globals)) = json.get("globals") {
        for (section, value) in globals {
            let nested = match value {
                Value::Object(map) => !map.is_empty(),
                Value::Array(items) => items.iter().any(Value::is_object),
                _ => false,
            };
            if nested {
                out.push(String::new());
                out.push(heading(section));
                append_flattened(&mut out, "", value);
            } else {
                append_flattened(&mut out, section, value);
            }
        }
    }

    for interface in facts.interfaces {
        out.push(String::new());
        out.push(heading(&format!(
            "interface {} ({})",
            interface.short_name, interface.name
        )));
        let value = serde_json::to_value(interface)?;
        if let Value::Object(fields) = value {
            for (key, field) in &fields {
                if matches!(key.as_str(), "name" | "short_name" | "line") {
                    continue;
                }
                let mut field = field.clone();
                if facts.result_mode == ResultMode::Minimal {
                    if field.is_null() {
                        continue;
                    }
                    prune_nulls(&mut field);
                }
                append_flattened(&mut out, key, &field);
            }
        }
        if !interface.unprocessed.is_empty() {
            out.push(
                format!("  {} unprocessed line(s)", interface.unprocessed.len())
                    .yellow()
                    .to_string(),
            );
        }
    }

    Ok(out.join("\n"))
}

fn heading(text: &str) -> String {
    text.cyan().bold().to_string()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn append_flattened(out: &mut Vec<String>, path: &str, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, member) in map {
                append_flattened(out, &join_path(path, key), member);
            }
        }
        Value::Array(items) if items.iter().any(|item| item.is_object()) => {
            for (index, item) in items.iter().enumerate() {
                append_flattened(out, &join_path(path, &index.to_string()), item);
            }
        }
        Value::Array(items) => {
            let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
            out.push(format!("- {path}: {joined}"));
        }
        Value::Object(_) => out.push(format!("- {path}: {{}}")),
        scalar => out.push(format!("- {path}: {}", scalar_text(scalar))),
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
