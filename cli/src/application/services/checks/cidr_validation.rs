//! `validate_cidr_ranges` — VPC CIDR parseability, size, and subnet layout.

use serde_json::{Value, json};

use crate::application::ports::{Check, CheckContext, CheckFuture};
use crate::domain::cidr::Cidr;
use crate::domain::{CheckDetails, CheckOutcome, OutputSet};

pub const NAME: &str = "validate_cidr_ranges";

/// Optional list outputs holding subnet blocks that must fit the VPC.
const SUBNET_OUTPUTS: &[&str] = &[
    "subnet_cidr_blocks",
    "public_subnet_cidrs",
    "private_subnet_cidrs",
];

/// Validates CIDR ranges for overlaps and proper formatting.
#[derive(Debug, Default, Clone, Copy)]
pub struct CidrValidationCheck;

impl Check for CidrValidationCheck {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Validates CIDR ranges for overlaps and proper formatting"
    }

    fn execute<'a>(&'a self, _ctx: &'a CheckContext, outputs: &'a OutputSet) -> CheckFuture<'a> {
        Box::pin(async move { validate(outputs) })
    }
}

fn size_value(cidr: &Cidr) -> Value {
    match cidr.size() {
        Some(n) => u64::try_from(n).map_or_else(|_| Value::from(n.to_string()), Value::from),
        None => Value::from("2^128"),
    }
}

fn size_text(cidr: &Cidr) -> String {
    cidr.size().map_or_else(|| "2^128".to_string(), |n| n.to_string())
}

fn validate(outputs: &OutputSet) -> CheckOutcome {
    let Some(vpc_cidr) = outputs.get_str("vpc_cidr_block") else {
        return CheckOutcome::missing_output("vpc_cidr_block", "VPC CIDR block");
    };

    let mut details = CheckDetails::new();
    details.insert("vpc_cidr".to_string(), Value::from(vpc_cidr));

    let vpc: Cidr = match vpc_cidr.parse() {
        Ok(c) => c,
        Err(e) => {
            details.insert("error".to_string(), Value::from(e.to_string()));
            return CheckOutcome::fail(format!("Invalid VPC CIDR: {e}"), details);
        }
    };

    let mut checks = vec![
        format!("VPC CIDR {vpc_cidr} is valid"),
        format!("VPC network size: {} addresses", size_text(&vpc)),
    ];
    details.insert("network_size".to_string(), size_value(&vpc));
    details.insert("prefix_length".to_string(), Value::from(vpc.prefix_len()));

    let mut problems = Vec::new();
    let mut subnets: Vec<(String, Cidr)> = Vec::new();
    for output in SUBNET_OUTPUTS {
        let Some(value) = outputs.get(output) else {
            continue;
        };
        let Some(blocks) = outputs.get_str_list(output) else {
            problems.push(format!("output {output} is not a list of strings: {value}"));
            continue;
        };
        for block in blocks {
            match block.parse::<Cidr>() {
                Ok(c) if vpc.contains(&c) => subnets.push((block.to_string(), c)),
                Ok(_) => problems.push(format!("subnet {block} is outside VPC {vpc_cidr}")),
                Err(e) => problems.push(format!("subnet {block}: {e}")),
            }
        }
    }

    let mut overlaps = Vec::new();
    for (i, (a_text, a)) in subnets.iter().enumerate() {
        for (b_text, b) in &subnets[i + 1..] {
            if a.overlaps(b) {
                overlaps.push(json!([a_text, b_text]));
                problems.push(format!("subnets {a_text} and {b_text} overlap"));
            }
        }
    }

    if !subnets.is_empty() {
        checks.push(format!("{} subnet CIDRs inside VPC range", subnets.len()));
        details.insert(
            "subnet_cidrs".to_string(),
            Value::from(subnets.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>()),
        );
        details.insert("overlaps".to_string(), Value::Array(overlaps));
    }
    details.insert("checks".to_string(), Value::from(checks));

    if problems.is_empty() {
        CheckOutcome::pass("CIDR validation passed", details)
    } else {
        let message = format!("CIDR validation failed: {}", problems.join("; "));
        details.insert("problems".to_string(), Value::from(problems));
        CheckOutcome::fail(message, details)
    }
}
