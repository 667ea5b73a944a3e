//! Cloud inventory records read by network checks.
//!
//! Field names follow the EC2 `describe-*` JSON documents so the records
//! deserialize directly from the AWS CLI.

use serde::Deserialize;

/// A subnet as reported by `ec2 describe-subnets`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRecord {
    pub subnet_id: String,
    #[serde(default)]
    pub cidr_block: String,
    #[serde(default)]
    pub availability_zone: String,
}

/// A route table as reported by `ec2 describe-route-tables`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTableRecord {
    pub route_table_id: String,
    #[serde(default)]
    pub associations: Vec<serde_json::Value>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

/// One route inside a route table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteRecord {
    #[serde(default)]
    pub destination_cidr_block: Option<String>,
    #[serde(default)]
    pub gateway_id: Option<String>,
}

impl RouteRecord {
    /// Whether the route targets an internet gateway.
    #[must_use]
    pub fn is_internet_route(&self) -> bool {
        self.gateway_id
            .as_deref()
            .is_some_and(|gw| gw.contains("igw-"))
    }
}

/// Top-level `describe-subnets` document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSubnets {
    #[serde(default)]
    pub subnets: Vec<SubnetRecord>,
}

/// Top-level `describe-route-tables` document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeRouteTables {
    #[serde(default)]
    pub route_tables: Vec<RouteTableRecord>,
}
