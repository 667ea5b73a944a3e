//! Flattened Terraform outputs consumed by checks.
//!
//! Pure functions only — parsing happens on text already captured by the
//! infrastructure layer.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::error::ParseError;

/// Fallback `vpc_id` used when tool output cannot be parsed.
pub const FALLBACK_VPC_ID: &str = "vpc-mock123";
/// Fallback `vpc_cidr_block` used when tool output cannot be parsed.
pub const FALLBACK_VPC_CIDR: &str = "10.0.0.0/16";

/// Map of output name to value published by a provisioning run.
///
/// Read-only to checks; keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputSet(BTreeMap<String, Value>);

impl OutputSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The documented degradation set returned for unparseable tool output.
    #[must_use]
    pub fn fallback() -> Self {
        [
            ("vpc_id", Value::from(FALLBACK_VPC_ID)),
            ("vpc_cidr_block", Value::from(FALLBACK_VPC_CIDR)),
        ]
        .into_iter()
        .collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up an output that must be a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Look up an output that must be a list of strings.
    ///
    /// Returns `None` when the output is absent or any element is not a string.
    #[must_use]
    pub fn get_str_list(&self, name: &str) -> Option<Vec<&str>> {
        self.0
            .get(name)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for OutputSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// How an `OutputSet` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    /// Parsed from the tool's JSON.
    Parsed,
    /// Tool output was unparseable; the fallback set was substituted.
    Fallback,
}

/// Parse tool JSON into an `OutputSet`.
///
/// Accepts both shapes Terraform emits:
/// - `output -json`: `{"name": {"value": ..., "type": ..., "sensitive": ...}}`
/// - `show -json`: `{"values": {"outputs": {"name": {"value": ...}}}}`
///
/// Records without a `value` field are skipped. A `show -json` document
/// without `values` (empty state) yields an empty set.
///
/// # Errors
///
/// Returns `ParseError` if the text is not a JSON object.
pub fn parse_outputs(raw: &str) -> Result<OutputSet, ParseError> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| ParseError {
        what: "terraform outputs",
        reason: e.to_string(),
    })?;
    let Value::Object(top) = doc else {
        return Err(ParseError {
            what: "terraform outputs",
            reason: "expected a JSON object".to_string(),
        });
    };

    let records = if top.contains_key("format_version") || top.contains_key("values") {
        match top.get("values").and_then(|v| v.get("outputs")) {
            Some(Value::Object(outputs)) => outputs.clone(),
            _ => return Ok(OutputSet::new()),
        }
    } else {
        top
    };

    Ok(records
        .into_iter()
        .filter_map(|(name, record)| record.get("value").cloned().map(|v| (name, v)))
        .collect())
}

/// Extract outputs, degrading to [`OutputSet::fallback`] on unparseable input.
#[must_use]
pub fn extract_outputs(raw: &str) -> (OutputSet, OutputSource) {
    match parse_outputs(raw) {
        Ok(set) => (set, OutputSource::Parsed),
        Err(_) => (OutputSet::fallback(), OutputSource::Fallback),
    }
}
