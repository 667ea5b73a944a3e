//! `verify_route_tables` — route tables exist and whether any reach an IGW.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::application::ports::{Check, CheckContext, CheckFuture, NetworkInventory};
use crate::domain::inventory::RouteTableRecord;
use crate::domain::{CheckDetails, CheckOutcome, OutputSet};

pub const NAME: &str = "verify_route_tables";

/// Verifies route table configuration and associations.
pub struct RouteTableCheck<I> {
    inventory: Arc<I>,
}

impl<I: NetworkInventory> RouteTableCheck<I> {
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

        let tables = match self.inventory.describe_route_tables(vpc_id).await {
            Ok(t) => t,
            Err(e) => {
                details.insert("error".to_string(), Value::from(format!("{e:#}")));
                return CheckOutcome::fail(format!("Failed to describe route tables: {e:#}"), details);
            }
        };

        let has_internet_route = tables
            .iter()
            .flat_map(|t| &t.routes)
            .any(|r| r.destination_cidr_block.is_some() && r.is_internet_route());

        details.insert("route_table_count".to_string(), Value::from(tables.len()));
        details.insert(
            "route_tables".to_string(),
            Value::Array(tables.iter().map(describe_table).collect()),
        );
        details.insert("has_internet_route".to_string(), Value::from(has_internet_route));

        let message = format!(
            "Found {} route tables, internet route: {has_internet_route}",
            tables.len()
        );
        if tables.is_empty() {
            CheckOutcome::fail(message, details)
        } else {
            CheckOutcome::pass(message, details)
        }
    }
}

fn describe_table(table: &RouteTableRecord) -> Value {
    let routes: Vec<String> = table
        .routes
        .iter()
        .filter_map(|r| {
            let dest = r.destination_cidr_block.as_deref()?;
            Some(if r.is_internet_route() {
                format!("{dest} -> IGW")
            } else {
                dest.to_string()
            })
        })
        .collect();
    json!({
        "id": table.route_table_id,
        "associations": table.associations.len(),
        "routes": routes,
    })
}

impl<I: NetworkInventory> Check for RouteTableCheck<I> {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Verifies route table configuration and associations"
    }

    fn execute<'a>(&'a self, _ctx: &'a CheckContext, outputs: &'a OutputSet) -> CheckFuture<'a> {
        Box::pin(self.run(outputs))
    }
}
