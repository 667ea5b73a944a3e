//! Check result types.
//!
//! A check produces a [`CheckOutcome`]; the executor stamps it with the
//! check name and timing to build the immutable [`CheckResult`].

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::domain::error::CheckError;

/// Machine-readable evidence attached to a result.
pub type CheckDetails = BTreeMap<String, Value>;

/// What a check reports about its own run, before timing is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub success: bool,
    pub message: String,
    pub details: CheckDetails,
}

impl CheckOutcome {
    #[must_use]
    pub fn pass(message: impl Into<String>, details: CheckDetails) -> Self {
        Self {
            success: true,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>, details: CheckDetails) -> Self {
        Self {
            success: false,
            message: message.into(),
            details,
        }
    }

    /// Failed outcome for a required output that is missing or mistyped.
    #[must_use]
    pub fn missing_output(output: &str, what: &str) -> Self {
        let mut details = CheckDetails::new();
        details.insert("missing_output".to_string(), Value::from(output));
        Self::fail(format!("{what} not found in outputs"), details)
    }
}

/// Result of one check invocation. Constructed once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    success: bool,
    message: String,
    details: CheckDetails,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    check_name: String,
    timestamp: DateTime<Utc>,
}

impl CheckResult {
    /// Build a result from a check's outcome and the timing measured around it.
    #[must_use]
    pub fn from_outcome(
        check_name: &str,
        outcome: CheckOutcome,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            details: outcome.details,
            duration,
            check_name: check_name.to_string(),
            timestamp: started_at,
        }
    }

    /// Failed result for a check that never completed (unknown, cancelled,
    /// or timed out).
    #[must_use]
    pub fn from_error(
        check_name: &str,
        error: &CheckError,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let mut details = CheckDetails::new();
        details.insert("error_kind".to_string(), Value::from(error.kind()));
        Self {
            success: false,
            message: error.to_string(),
            details,
            duration,
            check_name: check_name.to_string(),
            timestamp: started_at,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn details(&self) -> &CheckDetails {
        &self.details
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    /// When the invocation started.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's serialize_with signature
fn serialize_millis<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl CheckSummary {
    #[must_use]
    pub fn of(results: &[CheckResult]) -> Self {
        let passed = results.iter().filter(|r| r.success()).count();
        Self {
            passed,
            failed: results.len() - passed,
            total: results.len(),
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
