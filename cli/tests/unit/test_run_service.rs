//! Unit tests for end-to-end runs, existing-workspace checks, and the
//! destroy-all sweep.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tfprobe_cli::application::ports::CheckContext;
use tfprobe_cli::application::services::check_registry::CheckRegistry;
use tfprobe_cli::application::services::checks::CidrValidationCheck;
use tfprobe_cli::application::services::test_run::{
    RunMode, RunReport, destroy_all_test_workspaces, run_checks_on_existing, run_test_case,
};
use tfprobe_cli::application::services::workspace_manager::{CleanupOutcome, WorkspaceManager};
use tfprobe_cli::domain::{OutputSource, TestCase, WorkspaceState};

use crate::helpers::{MemoryVarFile, RecordingReporter, SHOW_JSON, ScriptedTool, fail, ok};

fn ctx() -> CheckContext {
    CheckContext::new(CancellationToken::new(), Duration::from_secs(5))
}

fn registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry.register(CidrValidationCheck);
    registry
}

fn case(checks: &[&str]) -> TestCase {
    let mut case = TestCase::default();
    case.metadata.name = "Network Test".into();
    case.terraform
        .tfvars
        .insert("vpc_cidr".into(), serde_yaml::Value::from("10.0.0.0/16"));
    case.test_functions = checks.iter().map(|c| (*c).to_string()).collect();
    case
}

struct Harness {
    manager: WorkspaceManager<ScriptedTool>,
    registry: CheckRegistry,
    var_file: MemoryVarFile,
    reporter: RecordingReporter,
}

impl Harness {
    fn new(tool: ScriptedTool) -> Self {
        Self {
            manager: WorkspaceManager::new(tool),
            registry: registry(),
            var_file: MemoryVarFile::default(),
            reporter: RecordingReporter::default(),
        }
    }

    async fn run(&mut self, case: &TestCase, mode: RunMode) -> anyhow::Result<RunReport> {
        self.run_with(&ctx(), case, mode).await
    }

    async fn run_with(
        &mut self,
        ctx: &CheckContext,
        case: &TestCase,
        mode: RunMode,
    ) -> anyhow::Result<RunReport> {
        run_test_case(
            &mut self.manager,
            &self.registry,
            ctx,
            case,
            &self.var_file,
            mode,
            &self.reporter,
        )
        .await
    }

    fn calls(&self) -> Vec<String> {
        self.manager.tool().calls()
    }
}

// ── run_test_case ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ephemeral_run_provisions_checks_and_tears_down() {
    let mut h = Harness::new(ScriptedTool::new().on("show", ok(SHOW_JSON)));

    let report = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::Ephemeral)
        .await
        .expect("run");

    let ws = report.workspace.clone();
    assert!(ws.starts_with("test-network-test-"), "{ws}");
    assert_eq!(
        h.calls(),
        vec![
            "init".to_string(),
            format!("workspace_select {ws}"),
            "plan".into(),
            "apply".into(),
            "show".into(),
            "destroy".into(),
            "workspace_select default".into(),
            format!("workspace_delete {ws}"),
        ]
    );
    assert_eq!(report.test_case, "Network Test");
    assert_eq!(report.output_source, Some(OutputSource::Parsed));
    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].success(), "{}", report.results[0].message());
    assert!(report.summary.all_passed());
    assert_eq!(
        report.teardown,
        Some(CleanupOutcome::Graceful { workspace: ws })
    );
    assert!(report.workspace_info.is_none());
    assert!(h.manager.current_workspace().is_none());
}

#[tokio::test]
async fn unknown_check_is_reported_as_failed_result() {
    let mut h = Harness::new(ScriptedTool::new().on("show", ok(SHOW_JSON)));

    let report = h
        .run(
            &case(&["validate_cidr_ranges", "no_such_check"]),
            RunMode::Ephemeral,
        )
        .await
        .expect("run");

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[1].check_name(), "no_such_check");
    assert!(!report.results[1].success());
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.summary.all_passed());
}

#[tokio::test]
async fn var_file_carries_case_variables_and_test_tags() {
    let mut h = Harness::new(ScriptedTool::new().on("show", ok(SHOW_JSON)));

    let report = h.run(&case(&[]), RunMode::Ephemeral).await.expect("run");

    let contents = h.var_file.contents.borrow().clone().expect("written");
    assert!(contents.contains("vpc_cidr = \"10.0.0.0/16\""), "{contents}");
    assert!(contents.contains("common_tags = {"), "{contents}");
    assert!(
        contents.contains(&format!("\"TestWorkspace\" = \"{}\"", report.workspace)),
        "{contents}"
    );
    assert!(contents.contains("\"TestCase\" = \"Network Test\""), "{contents}");
    assert!(contents.contains("\"CreatedBy\" = \"tfprobe\""), "{contents}");
}

#[tokio::test]
async fn plan_only_skips_apply_and_checks_but_tears_down() {
    let mut h = Harness::new(ScriptedTool::new());

    let report = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::PlanOnly)
        .await
        .expect("run");

    assert_eq!(h.manager.tool().count("apply"), 0);
    assert_eq!(h.manager.tool().count("show"), 0);
    assert_eq!(h.manager.tool().count("destroy"), 1);
    assert!(report.results.is_empty());
    assert!(report.output_source.is_none());
    assert!(matches!(report.teardown, Some(CleanupOutcome::Graceful { .. })));
}

#[tokio::test]
async fn keep_mode_leaves_environment_and_reports_info() {
    let mut h = Harness::new(
        ScriptedTool::new()
            .on("show", ok(SHOW_JSON))
            .on("state_list", ok("aws_vpc.main\n")),
    );

    let report = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::Keep)
        .await
        .expect("run");

    assert_eq!(h.manager.tool().count("destroy"), 0);
    assert_eq!(h.manager.tool().count("workspace_delete"), 0);
    assert!(report.teardown.is_none());
    let info = report.workspace_info.expect("info");
    assert_eq!(info.current_workspace.as_deref(), Some(report.workspace.as_str()));
    assert_eq!(info.state, WorkspaceState::Applied);
    assert!(info.has_resources);
    assert_eq!(h.manager.current_workspace(), Some(report.workspace.as_str()));
}

#[tokio::test]
async fn keep_mode_still_tears_down_a_failed_run() {
    let mut h = Harness::new(ScriptedTool::new().on("apply", fail("Error: quota exceeded")));

    let err = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::Keep)
        .await
        .expect_err("apply fails");

    assert!(format!("{err:#}").contains("terraform apply failed"), "{err:#}");
    assert_eq!(h.manager.tool().count("destroy"), 1);
    assert!(h.manager.current_workspace().is_none());
}

#[tokio::test]
async fn plan_failure_is_returned_after_teardown() {
    let mut h = Harness::new(ScriptedTool::new().on("plan", fail("Error: invalid reference")));

    let err = h
        .run(&case(&[]), RunMode::Ephemeral)
        .await
        .expect_err("plan fails");

    assert!(format!("{err:#}").contains("terraform plan failed"), "{err:#}");
    assert_eq!(h.manager.tool().count("apply"), 0);
    assert_eq!(h.manager.tool().count("destroy"), 1);
    assert!(
        h.reporter
            .events()
            .iter()
            .any(|e| e.starts_with("success: test environment ") && e.ends_with("cleaned up"))
    );
}

#[tokio::test]
async fn interrupted_run_never_plans_or_applies_and_tears_down() {
    let mut h = Harness::new(ScriptedTool::new().on("show", ok(SHOW_JSON)));
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CheckContext::new(token, Duration::from_secs(5));

    let err = h
        .run_with(&ctx, &case(&["validate_cidr_ranges"]), RunMode::Ephemeral)
        .await
        .expect_err("cancelled");

    assert!(format!("{err:#}").contains("run cancelled"), "{err:#}");
    assert_eq!(h.manager.tool().count("plan"), 0);
    assert_eq!(h.manager.tool().count("apply"), 0);
    assert_eq!(h.manager.tool().count("show"), 0);
    assert_eq!(h.manager.tool().count("destroy"), 1);
    assert!(h.manager.current_workspace().is_none());
}

#[tokio::test]
async fn interrupted_keep_run_is_not_kept() {
    let mut h = Harness::new(ScriptedTool::new());
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CheckContext::new(token, Duration::from_secs(5));

    h.run_with(&ctx, &case(&[]), RunMode::Keep)
        .await
        .expect_err("cancelled");

    assert_eq!(h.manager.tool().count("apply"), 0);
    assert_eq!(h.manager.tool().count("workspace_delete"), 1);
    assert!(h.manager.current_workspace().is_none());
}

#[tokio::test]
async fn failed_destroy_escalates_to_forced_deletion() {
    let mut h = Harness::new(
        ScriptedTool::new()
            .on("show", ok(SHOW_JSON))
            .on("destroy", fail("Error: dependency violation")),
    );

    let report = h.run(&case(&[]), RunMode::Ephemeral).await.expect("run");

    let ws = report.workspace.clone();
    assert!(matches!(
        &report.teardown,
        Some(CleanupOutcome::Forced { workspace, force_delete_succeeded: true, .. }) if *workspace == ws
    ));
    assert_eq!(h.manager.tool().count("workspace_delete -force"), 1);
    assert!(h.manager.current_workspace().is_none());
    let warnings = h.reporter.warnings();
    assert!(
        warnings.iter().any(|w| w.starts_with(&format!("cleanup failed for {ws}"))),
        "{warnings:?}"
    );
    assert!(!warnings.iter().any(|w| w.contains("orphaned")), "{warnings:?}");
}

#[tokio::test]
async fn failed_force_delete_warns_about_orphans() {
    let mut h = Harness::new(
        ScriptedTool::new()
            .on("show", ok(SHOW_JSON))
            .on("destroy", fail("Error: dependency violation"))
            .on("workspace_delete_force", fail("Error: state locked")),
    );

    let report = h.run(&case(&[]), RunMode::Ephemeral).await.expect("run");

    assert!(report.teardown.as_ref().is_some_and(CleanupOutcome::may_have_orphans));
    assert!(h.reporter.warnings().iter().any(|w| w.contains("orphaned")));
}

#[tokio::test]
async fn setup_failure_returns_without_teardown() {
    let mut h = Harness::new(ScriptedTool::new().on("init", fail("Error: backend unreachable")));

    let err = h.run(&case(&[]), RunMode::Ephemeral).await.expect_err("init fails");

    assert!(format!("{err:#}").contains("failed to set up test environment"), "{err:#}");
    assert_eq!(h.calls(), vec!["init".to_string()]);
    assert!(h.var_file.contents.borrow().is_none());
}

#[tokio::test]
async fn unparseable_outputs_fall_back_with_warning() {
    let mut h = Harness::new(ScriptedTool::new().on("show", ok("not json")));

    let report = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::Ephemeral)
        .await
        .expect("run");

    assert_eq!(report.output_source, Some(OutputSource::Fallback));
    assert_eq!(report.results.len(), 1);
    assert!(
        h.reporter
            .warnings()
            .iter()
            .any(|w| w.contains("fallback outputs"))
    );
}

#[tokio::test]
async fn failed_show_is_an_error_and_still_tears_down() {
    let mut h = Harness::new(ScriptedTool::new().on("show", fail("Error: no state")));

    let err = h
        .run(&case(&["validate_cidr_ranges"]), RunMode::Ephemeral)
        .await
        .expect_err("show fails");

    assert!(format!("{err:#}").contains("could not read terraform outputs"), "{err:#}");
    assert_eq!(h.manager.tool().count("destroy"), 1);
}

// ── run_checks_on_existing ───────────────────────────────────────────────────

#[tokio::test]
async fn existing_run_uses_first_test_workspace_with_resources() {
    let tool = ScriptedTool::new()
        .on("workspace_list", ok("  default\n  test-a-1\n* test-b-2\n"))
        .on("state_list", ok(""))
        .on("state_list", ok("aws_vpc.main\n"))
        .on("show", ok(SHOW_JSON));
    let mut manager = WorkspaceManager::new(tool);
    let reporter = RecordingReporter::default();

    let report = run_checks_on_existing(
        &mut manager,
        &registry(),
        &ctx(),
        &case(&["validate_cidr_ranges"]),
        &reporter,
    )
    .await
    .expect("run");

    assert_eq!(report.workspace, "test-b-2");
    assert_eq!(report.results.len(), 1);
    assert!(report.teardown.is_none());
    assert_eq!(manager.tool().count("workspace_select default"), 0);
    assert_eq!(manager.tool().count("destroy"), 0);
    assert!(
        reporter
            .events()
            .contains(&"success: using existing workspace: test-b-2".to_string())
    );
}

#[tokio::test]
async fn existing_run_without_populated_workspace_errors() {
    let tool = ScriptedTool::new().on("workspace_list", ok("* default\n  test-a-1\n"));
    let mut manager = WorkspaceManager::new(tool);

    let err = run_checks_on_existing(
        &mut manager,
        &registry(),
        &ctx(),
        &case(&[]),
        &RecordingReporter::default(),
    )
    .await
    .expect_err("nothing to test");

    assert!(err.to_string().contains("No test workspace with resources found"), "{err}");
}

// ── destroy_all_test_workspaces ──────────────────────────────────────────────

#[tokio::test]
async fn destroy_all_sweeps_test_workspaces_and_spares_default() {
    let tool = ScriptedTool::new()
        .on("workspace_list", ok("* default\n  test-a-1\n  test-b-2\n  staging\n"))
        .on("destroy", fail("Error: dependency violation"));
    let mut manager = WorkspaceManager::new(tool);

    let summary = destroy_all_test_workspaces(&mut manager, &RecordingReporter::default())
        .await
        .expect("sweep");

    assert_eq!(summary.forced, vec!["test-a-1".to_string()]);
    assert_eq!(summary.cleaned, vec!["test-b-2".to_string()]);
    assert!(summary.unselectable.is_empty());
    let calls = manager.tool().calls();
    assert!(calls.contains(&"workspace_delete -force test-a-1".to_string()));
    assert!(calls.contains(&"workspace_delete test-b-2".to_string()));
    assert!(!calls.iter().any(|c| c.ends_with(" staging")));
    assert!(!calls.iter().any(|c| c.starts_with("workspace_delete") && c.ends_with(" default")));
    assert!(manager.current_workspace().is_none());
}

#[tokio::test]
async fn destroy_all_skips_unselectable_workspaces() {
    let tool = ScriptedTool::new()
        .on("workspace_list", ok("  test-a-1\n  test-b-2\n"))
        .on("workspace_select", fail("Workspace \"test-a-1\" doesn't exist."))
        .on("workspace_new", fail("Error: state locked"));
    let mut manager = WorkspaceManager::new(tool);
    let reporter = RecordingReporter::default();

    let summary = destroy_all_test_workspaces(&mut manager, &reporter)
        .await
        .expect("sweep");

    assert_eq!(summary.unselectable, vec!["test-a-1".to_string()]);
    assert_eq!(summary.cleaned, vec!["test-b-2".to_string()]);
    assert_eq!(manager.tool().count("destroy"), 1);
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.starts_with("failed to select workspace test-a-1"))
    );
}

#[tokio::test]
async fn destroy_all_propagates_list_failure() {
    let tool = ScriptedTool::new().on("workspace_list", fail("Error: backend unreachable"));
    let mut manager = WorkspaceManager::new(tool);

    let err = destroy_all_test_workspaces(&mut manager, &RecordingReporter::default())
        .await
        .expect_err("list fails");

    assert!(err.to_string().contains("failed to list workspaces"), "{err}");
}
