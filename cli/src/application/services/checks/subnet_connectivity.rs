//! `test_subnet_connectivity` — the VPC exposes at least one subnet.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::application::ports::{Check, CheckContext, CheckFuture, NetworkInventory};
use crate::domain::{CheckDetails, CheckOutcome, OutputSet};

pub const NAME: &str = "test_subnet_connectivity";

/// Cross-references the VPC's subnets in the cloud inventory.
pub struct SubnetConnectivityCheck<I> {
    inventory: Arc<I>,
}

impl<I: NetworkInventory> SubnetConnectivityCheck<I> {
    #[must_use]
    pub fn new(inventory: Arc<I>) -> Self {
        Self { inventory }
    }

    async fn run(&self, outputs: &OutputSet) -> CheckOutcome {
        let Some(vpc_id) = outputs.get_str("vpc_id") else {
            return CheckOutcome::missing_output("vpc_id", "VPC ID");
        };

        let mut details = CheckDetails::new();
        details.insert("vpc_id".to_string(), Value::from(vpc_id));

        let subnets = match self.inventory.describe_subnets(vpc_id).await {
            Ok(s) => s,
            Err(e) => {
                details.insert("error".to_string(), Value::from(format!("{e:#}")));
                return CheckOutcome::fail(format!("Failed to describe subnets: {e:#}"), details);
            }
        };

        let count = subnets.len();
        details.insert("subnet_count".to_string(), Value::from(count));
        details.insert(
            "subnets".to_string(),
            Value::Array(
                subnets
                    .iter()
                    .map(|s| json!({"id": s.subnet_id, "cidr": s.cidr_block, "az": s.availability_zone}))
                    .collect(),
            ),
        );

        let message = format!("Found {count} subnets in VPC");
        if count > 0 {
            CheckOutcome::pass(message, details)
        } else {
            CheckOutcome::fail(message, details)
        }
    }
}

impl<I: NetworkInventory> Check for SubnetConnectivityCheck<I> {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Tests connectivity between subnets"
    }

    fn execute<'a>(&'a self, _ctx: &'a CheckContext, outputs: &'a OutputSet) -> CheckFuture<'a> {
        Box::pin(self.run(outputs))
    }
}
