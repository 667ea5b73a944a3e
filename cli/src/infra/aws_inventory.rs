//! Infrastructure implementation of the `NetworkInventory` port.
//!
//! `AwsCliInventory<R>` shells out to `aws ec2 describe-*` through a
//! `CommandRunner` and deserializes the JSON documents it prints.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::ports::{CommandRunner, NetworkInventory};
use crate::domain::config::AwsConfig;
use crate::domain::inventory::{
    DescribeRouteTables, DescribeSubnets, RouteTableRecord, SubnetRecord,
};

/// EC2 inventory read through the AWS CLI.
pub struct AwsCliInventory<R: CommandRunner> {
    runner: R,
    config: AwsConfig,
}

impl<R: CommandRunner> AwsCliInventory<R> {
    pub fn new(runner: R, config: AwsConfig) -> Self {
        Self { runner, config }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Arguments for `aws ec2 <operation>` filtered to one VPC.
    fn args(&self, operation: &str, vpc_id: &str) -> Vec<String> {
        let mut args = vec![
            "ec2".to_string(),
            operation.to_string(),
            "--region".to_string(),
            self.config.region.clone(),
        ];
        if let Some(profile) = &self.config.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args.push("--filters".to_string());
        args.push(format!("Name=vpc-id,Values={vpc_id}"));
        args.push("--output".to_string());
        args.push("json".to_string());
        args
    }

    async fn describe<T: DeserializeOwned>(&self, operation: &str, vpc_id: &str) -> Result<T> {
        let args = self.args(operation, vpc_id);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!(operation, vpc_id, "querying inventory");
        let output = self
            .runner
            .run(&self.config.binary, &arg_refs)
            .await
            .with_context(|| format!("aws ec2 {operation}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("aws ec2 {operation} failed: {}", stderr.trim());
        }
        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("failed to parse aws ec2 {operation} output"))
    }
}

impl<R: CommandRunner> NetworkInventory for AwsCliInventory<R> {
    async fn describe_subnets(&self, vpc_id: &str) -> Result<Vec<SubnetRecord>> {
        let doc: DescribeSubnets = self.describe("describe-subnets", vpc_id).await?;
        Ok(doc.subnets)
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTableRecord>> {
        let doc: DescribeRouteTables = self.describe("describe-route-tables", vpc_id).await?;
        Ok(doc.route_tables)
    }
}
