//! Test case schema loaded from YAML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::TestCaseError;

/// One infrastructure test: what to provision and which checks to run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    pub metadata: TestMetadata,
    pub terraform: TerraformSection,
    /// Check names, executed in this order.
    pub test_functions: Vec<String>,
}

/// Descriptive fields shown to the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub severity: String,
    pub expected_result: String,
    pub description: String,
}

/// Variables passed through to the provisioning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformSection {
    pub tfvars: BTreeMap<String, serde_yaml::Value>,
}

/// Pick a test case by name (case-insensitive), or the first one.
///
/// # Errors
///
/// Returns an error if `cases` is empty or no case matches `name`.
pub fn select_case<'a>(
    cases: &'a [TestCase],
    name: Option<&str>,
    source: &str,
) -> Result<&'a TestCase, TestCaseError> {
    let first = cases
        .first()
        .ok_or_else(|| TestCaseError::NoneFound(source.to_string()))?;
    let Some(name) = name else {
        return Ok(first);
    };
    cases
        .iter()
        .find(|c| c.metadata.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| TestCaseError::NotFound {
            name: name.to_string(),
            available: cases
                .iter()
                .map(|c| c.metadata.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
