//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod check;
pub mod cidr;
pub mod config;
pub mod error;
pub mod execution;
pub mod inventory;
pub mod outputs;
pub mod test_case;
pub mod tfvars;
pub mod workspace;

pub use check::{CheckDetails, CheckOutcome, CheckResult, CheckSummary};
pub use config::{HarnessConfig, validate_config};
pub use error::{
    CheckError, CleanupError, CleanupStage, ConfigError, LifecycleError, ParseError, SetupError,
    TestCaseError, ToolInvocationError, WorkspaceError,
};
pub use execution::ExecutionResult;
pub use outputs::{OutputSet, OutputSource, extract_outputs};
pub use test_case::TestCase;
pub use workspace::{WorkspaceInfo, WorkspaceState};
