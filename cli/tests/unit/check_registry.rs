//! Unit tests for the check registry and executor.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use tfprobe_cli::application::ports::{Check, CheckContext, CheckFuture};
use tfprobe_cli::application::services::check_registry::CheckRegistry;
use tfprobe_cli::application::services::checks::default_registry;
use tfprobe_cli::domain::{CheckDetails, CheckOutcome, OutputSet};

use crate::helpers::StaticInventory;

struct Fixed {
    name: &'static str,
    success: bool,
    delay: Duration,
    runs: Rc<Cell<u32>>,
}

impl Fixed {
    fn new(name: &'static str, success: bool) -> Self {
        Self {
            name,
            success,
            delay: Duration::ZERO,
            runs: Rc::new(Cell::new(0)),
        }
    }

    fn slow(name: &'static str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(name, true)
        }
    }
}

impl Check for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "fixed outcome"
    }

    fn execute<'a>(&'a self, _ctx: &'a CheckContext, _outputs: &'a OutputSet) -> CheckFuture<'a> {
        Box::pin(async move {
            self.runs.set(self.runs.get() + 1);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.success {
                CheckOutcome::pass(format!("{} ok", self.name), CheckDetails::new())
            } else {
                CheckOutcome::fail(format!("{} failed", self.name), CheckDetails::new())
            }
        })
    }
}

fn ctx(timeout: Duration) -> CheckContext {
    CheckContext::new(CancellationToken::new(), timeout)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[test]
fn list_available_is_sorted_and_register_overwrites() {
    let mut registry = CheckRegistry::new();
    registry.register(Fixed::new("zeta", true));
    registry.register(Fixed::new("alpha", true));
    registry.register(Fixed::new("alpha", false));

    let listed: Vec<_> = registry.list_available().into_iter().map(|(n, _)| n).collect();
    assert_eq!(listed, vec!["alpha", "zeta"]);
    assert!(registry.contains("zeta"));
    assert!(!registry.contains("missing"));
}

#[tokio::test]
async fn unknown_check_fails_with_not_found() {
    let registry = CheckRegistry::new();
    let result = registry
        .execute_one(&ctx(Duration::from_secs(5)), "nope", &OutputSet::new())
        .await;
    assert!(!result.success());
    assert_eq!(result.message(), "not found");
    assert_eq!(result.check_name(), "nope");
    assert_eq!(
        result.details().get("error_kind"),
        Some(&Value::from("check_not_found"))
    );
}

#[tokio::test]
async fn execute_all_keeps_order_and_length() {
    let mut registry = CheckRegistry::new();
    registry.register(Fixed::new("b", false));
    registry.register(Fixed::new("a", true));

    let results = registry
        .execute_all(
            &ctx(Duration::from_secs(5)),
            &names(&["b", "missing", "a", "b"]),
            &OutputSet::new(),
        )
        .await;

    let got: Vec<_> = results
        .iter()
        .map(|r| (r.check_name().to_string(), r.success()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("b".to_string(), false),
            ("missing".to_string(), false),
            ("a".to_string(), true),
            ("b".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn execute_all_of_nothing_is_empty() {
    let registry = CheckRegistry::new();
    let results = registry
        .execute_all(&ctx(Duration::from_secs(5)), &[], &OutputSet::new())
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn slow_check_times_out_without_blocking_the_batch() {
    let mut registry = CheckRegistry::new();
    registry.register(Fixed::slow("slow", Duration::from_secs(30)));
    registry.register(Fixed::new("fast", true));

    let results = registry
        .execute_all(
            &ctx(Duration::from_secs(1)),
            &names(&["slow", "fast"]),
            &OutputSet::new(),
        )
        .await;

    assert!(!results[0].success());
    assert_eq!(results[0].message(), "timed out after 1s");
    assert_eq!(
        results[0].details().get("error_kind"),
        Some(&Value::from("timed_out"))
    );
    assert!(results[1].success());
}

#[tokio::test]
async fn cancelled_context_skips_checks() {
    let check = Fixed::new("a", true);
    let runs = Rc::clone(&check.runs);
    let mut registry = CheckRegistry::new();
    registry.register(check);

    let token = CancellationToken::new();
    token.cancel();
    let ctx = CheckContext::new(token, Duration::from_secs(5));
    let result = registry.execute_one(&ctx, "a", &OutputSet::new()).await;

    assert!(!result.success());
    assert_eq!(result.message(), "cancelled");
    assert_eq!(runs.get(), 0);
}

#[tokio::test]
async fn cancellation_interrupts_running_check() {
    let mut registry = CheckRegistry::new();
    registry.register(Fixed::slow("slow", Duration::from_secs(30)));

    let token = CancellationToken::new();
    let ctx = CheckContext::new(token.clone(), Duration::from_secs(60));
    let outputs = OutputSet::new();
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    };
    let (result, ()) = tokio::join!(registry.execute_one(&ctx, "slow", &outputs), canceller);

    assert!(!result.success());
    assert_eq!(result.message(), "cancelled");
}

#[tokio::test]
async fn result_records_duration_and_start_time() {
    let mut registry = CheckRegistry::new();
    registry.register(Fixed::slow("nap", Duration::from_millis(20)));

    let before = Utc::now();
    let result = registry
        .execute_one(&ctx(Duration::from_secs(5)), "nap", &OutputSet::new())
        .await;

    assert!(result.success());
    assert!(result.duration() >= Duration::from_millis(20));
    assert!(result.timestamp() >= before);
    assert!(result.timestamp() <= Utc::now());
}

#[test]
fn default_registry_has_builtin_checks() {
    let registry = default_registry(Arc::new(StaticInventory::default()));
    let listed: Vec<_> = registry.list_available().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        listed,
        vec![
            "test_subnet_connectivity",
            "validate_cidr_ranges",
            "verify_route_tables"
        ]
    );
}
