//! Application service — named check registry and sequential executor.
//!
//! The executor never returns an error: unknown names, timeouts, and
//! cancellation all come back as failed [`CheckResult`]s so one check can
//! never block the rest of a batch.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::ports::{Check, CheckContext};
use crate::domain::error::CheckError;
use crate::domain::{CheckResult, OutputSet};

/// Name-keyed set of checks.
#[derive(Default)]
pub struct CheckRegistry {
    checks: BTreeMap<String, Box<dyn Check>>,
}

impl CheckRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a check, replacing any check already registered under its name.
    pub fn register(&mut self, check: impl Check + 'static) {
        let name = check.name().to_string();
        if self.checks.insert(name.clone(), Box::new(check)).is_some() {
            debug!(check = %name, "replaced registered check");
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// `(name, description)` of every registered check, sorted by name.
    #[must_use]
    pub fn list_available(&self) -> Vec<(&str, &str)> {
        self.checks
            .values()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Run one check by name.
    ///
    /// Duration and timestamp are measured around this invocation only.
    pub async fn execute_one(
        &self,
        ctx: &CheckContext,
        name: &str,
        outputs: &OutputSet,
    ) -> CheckResult {
        let started_at = Utc::now();
        let clock = Instant::now();

        let Some(check) = self.checks.get(name) else {
            warn!(check = %name, "check not registered");
            return CheckResult::from_error(
                name,
                &CheckError::NotFound(name.to_string()),
                started_at,
                clock.elapsed(),
            );
        };
        if ctx.is_cancelled() {
            return CheckResult::from_error(name, &CheckError::Cancelled, started_at, clock.elapsed());
        }

        let timeout = ctx.timeout();
        let result = tokio::select! {
            outcome = tokio::time::timeout(timeout, check.execute(ctx, outputs)) => match outcome {
                Ok(outcome) => CheckResult::from_outcome(name, outcome, started_at, clock.elapsed()),
                Err(_) => CheckResult::from_error(
                    name,
                    &CheckError::TimedOut(timeout.as_secs()),
                    started_at,
                    clock.elapsed(),
                ),
            },
            () = ctx.cancel_token().cancelled() => {
                CheckResult::from_error(name, &CheckError::Cancelled, started_at, clock.elapsed())
            }
        };

        info!(
            check = %name,
            success = result.success(),
            duration_ms = u64::try_from(result.duration().as_millis()).unwrap_or(u64::MAX),
            "check finished"
        );
        result
    }

    /// Run `names` in order, one result per name, in the same order.
    pub async fn execute_all(
        &self,
        ctx: &CheckContext,
        names: &[String],
        outputs: &OutputSet,
    ) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            results.push(self.execute_one(ctx, name, outputs).await);
        }
        results
    }
}
