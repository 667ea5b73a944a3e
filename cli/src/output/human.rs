//! Human-readable terminal renderer.

use std::time::Duration;

use owo_colors::OwoColorize as _;

use crate::application::services::test_run::{DestroySummary, RunReport};
use crate::domain::test_case::TestCase;
use crate::domain::{CheckResult, CheckSummary, WorkspaceInfo};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the results and summary of a run.
    pub fn render_run_report(&self, report: &RunReport) {
        if report.results.is_empty() {
            if !self.ctx.quiet {
                println!();
                self.ctx.info(&format!("no checks run for {}", report.test_case));
            }
        } else {
            if !self.ctx.quiet {
                println!();
                self.ctx
                    .header(&format!("Results: {} ({})", report.test_case, report.workspace));
                println!();
            }
            self.render_results(&report.results);
            self.render_summary(&report.summary);
        }
        if let Some(info) = &report.workspace_info {
            self.render_workspace_info(info);
        }
    }

    /// Where a kept environment lives, for a later `tfprobe test`.
    pub fn render_workspace_info(&self, info: &WorkspaceInfo) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv(
            "workspace",
            info.current_workspace.as_deref().unwrap_or("none"),
        );
        self.ctx.kv("state", &info.state.to_string());
        self.ctx
            .kv("resources", if info.has_resources { "yes" } else { "no" });
    }

    /// One block per check; failures always print, even when quiet.
    pub fn render_results(&self, results: &[CheckResult]) {
        for result in results {
            if result.success() {
                if self.ctx.quiet {
                    continue;
                }
                println!(
                    "  {} {}",
                    "✓ PASS".style(self.ctx.styles.success),
                    result_heading(result)
                );
                println!("    {}", result.message());
            } else {
                println!(
                    "  {} {}",
                    "✗ FAIL".style(self.ctx.styles.error),
                    result_heading(result)
                );
                println!("    {}", result.message());
                if !result.details().is_empty() {
                    for line in format_details(result).lines() {
                        println!("    {}", line.style(self.ctx.styles.dim));
                    }
                }
            }
        }
    }

    /// `passed/total` line.
    pub fn render_summary(&self, summary: &CheckSummary) {
        let line = format_summary(summary);
        println!();
        if summary.all_passed() {
            println!("  {}", line.style(self.ctx.styles.success));
        } else {
            println!("  {}", line.style(self.ctx.styles.error));
        }
    }

    /// List registered checks.
    pub fn render_check_list(&self, checks: &[(&str, &str)]) {
        println!("Available checks:\n");
        for (name, description) in checks {
            println!("  {name:<28} {}", description.style(self.ctx.styles.dim));
        }
    }

    /// List loaded test cases.
    pub fn render_cases(&self, cases: &[TestCase]) {
        if cases.is_empty() {
            println!("No test cases found.");
            return;
        }
        println!("Test cases:\n");
        for case in cases {
            let meta = &case.metadata;
            println!(
                "  {:<24} {:<10} {}",
                meta.name.style(self.ctx.styles.bold),
                meta.kind,
                meta.description.style(self.ctx.styles.dim)
            );
            if !case.test_functions.is_empty() {
                println!("    checks: {}", case.test_functions.join(", "));
            }
        }
    }

    /// List tool workspaces, highlighting harness-created ones.
    pub fn render_workspaces(&self, workspaces: &[String]) {
        if workspaces.is_empty() {
            println!("No workspaces.");
            return;
        }
        for ws in workspaces {
            if crate::domain::workspace::is_test_workspace(ws) {
                println!("  {}", ws.style(self.ctx.styles.warning));
            } else {
                println!("  {ws}");
            }
        }
    }

    /// Summarize a destroy-all sweep.
    pub fn render_destroy_summary(&self, summary: &DestroySummary) {
        if summary.cleaned.is_empty() && summary.forced.is_empty() && summary.unselectable.is_empty()
        {
            self.ctx.info("no test workspaces found");
            return;
        }
        println!();
        for ws in &summary.cleaned {
            self.ctx.success(&format!("{ws} destroyed"));
        }
        for ws in &summary.forced {
            self.ctx
                .warn(&format!("{ws} force-deleted; remote resources may be orphaned"));
        }
        for ws in &summary.unselectable {
            self.ctx.error(&format!("{ws} could not be selected"));
        }
    }
}

/// `name (duration)`.
#[must_use]
pub fn result_heading(result: &CheckResult) -> String {
    format!("{} ({})", result.check_name(), format_duration(result.duration()))
}

/// Milliseconds under one second, otherwise seconds with two decimals.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

#[must_use]
pub fn format_summary(summary: &CheckSummary) -> String {
    format!("{}/{} checks passed", summary.passed, summary.total)
}

/// Pretty JSON of a result's details.
#[must_use]
pub fn format_details(result: &CheckResult) -> String {
    serde_json::to_string_pretty(result.details()).unwrap_or_default()
}
