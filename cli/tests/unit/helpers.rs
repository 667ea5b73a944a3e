//! Shared test helpers: scripted port implementations and output constructors.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use tfprobe_cli::application::ports::{
    CommandRunner, NetworkInventory, ProgressReporter, ProvisioningTool, VarFileStore,
};
use tfprobe_cli::domain::ExecutionResult;
use tfprobe_cli::domain::inventory::{RouteRecord, RouteTableRecord, SubnetRecord};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

pub fn ok(output: &str) -> ExecutionResult {
    ExecutionResult::succeeded(output)
}

pub fn fail(output: &str) -> ExecutionResult {
    ExecutionResult::failed(output, "exit status: 1")
}

// ── ScriptedTool ─────────────────────────────────────────────────────────────

/// `ProvisioningTool` that replays queued results per operation and records
/// every call. Operations with nothing queued succeed with empty output.
///
/// Call log entries look like `"plan"`, `"workspace_select default"`,
/// `"workspace_delete -force test-x-1"`.
#[derive(Default)]
pub struct ScriptedTool {
    responses: RefCell<HashMap<&'static str, VecDeque<ExecutionResult>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `result` for the next call to `op`.
    #[must_use]
    pub fn on(self, op: &'static str, result: ExecutionResult) -> Self {
        self.responses
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls whose entry starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn respond(&self, op: &'static str, call: String) -> ExecutionResult {
        self.calls.borrow_mut().push(call);
        self.responses
            .borrow_mut()
            .get_mut(op)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ExecutionResult::succeeded(""))
    }
}

impl ProvisioningTool for ScriptedTool {
    async fn init(&self) -> ExecutionResult {
        self.respond("init", "init".into())
    }
    async fn validate(&self) -> ExecutionResult {
        self.respond("validate", "validate".into())
    }
    async fn plan(&self) -> ExecutionResult {
        self.respond("plan", "plan".into())
    }
    async fn apply(&self) -> ExecutionResult {
        self.respond("apply", "apply".into())
    }
    async fn destroy(&self) -> ExecutionResult {
        self.respond("destroy", "destroy".into())
    }
    async fn show_json(&self) -> ExecutionResult {
        self.respond("show", "show".into())
    }
    async fn state_list(&self) -> ExecutionResult {
        self.respond("state_list", "state_list".into())
    }
    async fn workspace_list(&self) -> ExecutionResult {
        self.respond("workspace_list", "workspace_list".into())
    }
    async fn workspace_select(&self, name: &str) -> ExecutionResult {
        self.respond("workspace_select", format!("workspace_select {name}"))
    }
    async fn workspace_new(&self, name: &str) -> ExecutionResult {
        self.respond("workspace_new", format!("workspace_new {name}"))
    }
    async fn workspace_delete(&self, name: &str, force: bool) -> ExecutionResult {
        if force {
            self.respond(
                "workspace_delete_force",
                format!("workspace_delete -force {name}"),
            )
        } else {
            self.respond("workspace_delete", format!("workspace_delete {name}"))
        }
    }
}

// ── ScriptedRunner ───────────────────────────────────────────────────────────

/// `CommandRunner` that replays queued outputs and records `program args...`.
/// Runs with nothing queued succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: RefCell<VecDeque<Result<Output>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(self, output: Result<Output>) -> Self {
        self.outputs.borrow_mut().push_back(output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::from_secs(1))
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        let mut call = program.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.borrow_mut().push(call);
        self.outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_output(b"")))
    }
}

// ── StaticInventory ──────────────────────────────────────────────────────────

/// `NetworkInventory` returning fixed records, or an error when `fail` is set.
#[derive(Default)]
pub struct StaticInventory {
    pub subnets: Vec<SubnetRecord>,
    pub route_tables: Vec<RouteTableRecord>,
    pub fail: Option<String>,
    pub queried: RefCell<Vec<String>>,
}

impl StaticInventory {
    pub fn two_subnets_with_igw() -> Self {
        Self {
            subnets: vec![
                subnet("subnet-a", "10.0.1.0/24", "eu-north-1a"),
                subnet("subnet-b", "10.0.2.0/24", "eu-north-1b"),
            ],
            route_tables: vec![
                RouteTableRecord {
                    route_table_id: "rtb-main".into(),
                    associations: vec![serde_json::json!({"Main": true})],
                    routes: vec![route("10.0.0.0/16", "local")],
                },
                RouteTableRecord {
                    route_table_id: "rtb-public".into(),
                    associations: vec![
                        serde_json::json!({"SubnetId": "subnet-a"}),
                        serde_json::json!({"SubnetId": "subnet-b"}),
                    ],
                    routes: vec![route("10.0.0.0/16", "local"), route("0.0.0.0/0", "igw-123")],
                },
            ],
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_string()),
            ..Self::default()
        }
    }
}

pub fn subnet(id: &str, cidr: &str, az: &str) -> SubnetRecord {
    SubnetRecord {
        subnet_id: id.into(),
        cidr_block: cidr.into(),
        availability_zone: az.into(),
    }
}

pub fn route(dest: &str, gateway: &str) -> RouteRecord {
    RouteRecord {
        destination_cidr_block: Some(dest.into()),
        gateway_id: Some(gateway.into()),
    }
}

impl NetworkInventory for StaticInventory {
    async fn describe_subnets(&self, vpc_id: &str) -> Result<Vec<SubnetRecord>> {
        self.queried.borrow_mut().push(format!("subnets {vpc_id}"));
        if let Some(msg) = &self.fail {
            anyhow::bail!("{msg}");
        }
        Ok(self.subnets.clone())
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTableRecord>> {
        self.queried.borrow_mut().push(format!("route_tables {vpc_id}"));
        if let Some(msg) = &self.fail {
            anyhow::bail!("{msg}");
        }
        Ok(self.route_tables.clone())
    }
}

// ── RecordingReporter ────────────────────────────────────────────────────────

/// `ProgressReporter` that records `"step: ..."`, `"success: ..."`,
/// `"warn: ..."` lines.
#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_owned))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.borrow_mut().push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(format!("warn: {message}"));
    }
}

// ── MemoryVarFile ────────────────────────────────────────────────────────────

/// `VarFileStore` that keeps the last written contents in memory.
#[derive(Default)]
pub struct MemoryVarFile {
    pub contents: RefCell<Option<String>>,
}

impl VarFileStore for MemoryVarFile {
    fn write_var_file(&self, contents: &str) -> Result<PathBuf> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(PathBuf::from("generated.tfvars"))
    }
}

// ── Canned tool output ───────────────────────────────────────────────────────

/// `show -json` document publishing a VPC and two subnets.
pub const SHOW_JSON: &str = r#"{
  "format_version": "1.0",
  "values": {
    "outputs": {
      "vpc_id": {"sensitive": false, "value": "vpc-0abc"},
      "vpc_cidr_block": {"sensitive": false, "value": "10.0.0.0/16"},
      "subnet_cidr_blocks": {"sensitive": false, "value": ["10.0.1.0/24", "10.0.2.0/24"]}
    },
    "root_module": {}
  }
}"#;
