//! Variables-file rendering.
//!
//! Produces plain `key = value` text consumed unmodified through
//! `-var-file`. Keys are emitted in sorted order so the file is stable
//! between runs.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde_yaml::Value;

/// Variable carrying the tags that identify harness-created resources.
pub const COMMON_TAGS_VAR: &str = "common_tags";

/// Tags identifying resources created for a test run.
#[must_use]
pub fn test_tags(test_name: &str, workspace: &str, now: DateTime<Utc>) -> BTreeMap<String, Value> {
    [
        ("TestCase", test_name.to_string()),
        ("TestWorkspace", workspace.to_string()),
        ("TestTimestamp", now.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        ("CreatedBy", "tfprobe".to_string()),
        ("AutoCleanup", "true".to_string()),
        ("Environment", "test".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Value::String(v)))
    .collect()
}

/// Render the variables file: the case's own variables plus `common_tags`.
///
/// A `common_tags` entry in `tfvars` is replaced by the generated tags.
#[must_use]
pub fn render_var_file(tfvars: &BTreeMap<String, Value>, tags: BTreeMap<String, Value>) -> String {
    let mut out = String::new();
    for (key, value) in tfvars.iter().filter(|(k, _)| k.as_str() != COMMON_TAGS_VAR) {
        let _ = writeln!(out, "{key} = {}", format_value(value, 0));
    }
    let tags = Value::Mapping(
        tags.into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect(),
    );
    let _ = writeln!(out, "{COMMON_TAGS_VAR} = {}", format_value(&tags, 0));
    out
}

fn format_value(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Sequence(items) => {
            let elements: Vec<String> = items.iter().map(|v| format_value(v, depth)).collect();
            format!("[{}]", elements.join(", "))
        }
        Value::Mapping(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let indent = "  ".repeat(depth + 1);
            let mut pairs: Vec<(String, String)> = map
                .iter()
                .map(|(k, v)| (key_text(k), format_value(v, depth + 1)))
                .collect();
            pairs.sort();
            let body: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{indent}{} = {v}", quote(&k)))
                .collect();
            format!("{{\n{}\n{}}}", body.join("\n"), "  ".repeat(depth))
        }
        Value::Tagged(tagged) => format_value(&tagged.value, depth),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Render `s` as an HCL string literal.
///
/// Control characters are written as escapes and `${` / `%{` are doubled so
/// terraform reads them as literal text rather than template directives.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
