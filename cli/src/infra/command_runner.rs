//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout, cancellation, and
//! kill on all platforms.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::ports::CommandRunner;

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` does not kill the child
/// when the timeout fires on every platform; the future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// an explicit `child.kill()` for timeout and cancellation alike.
pub struct TokioCommandRunner {
    timeout: Duration,
    working_dir: Option<PathBuf>,
    cancel: CancellationToken,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            working_dir: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Run every command from `dir` instead of the current directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill in-flight commands when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        if self.cancel.is_cancelled() {
            anyhow::bail!("{program} cancelled");
        }

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(program, ?args, dir = ?self.working_dir, "spawning");
        let started = Instant::now();
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        let output = tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
            () = self.cancel.cancelled() => {
                let _ = child.kill().await;
                anyhow::bail!("{program} cancelled")
            }
        };

        if let Ok(out) = &output {
            debug!(
                program,
                code = ?out.status.code(),
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "finished"
            );
        }
        output
    }
}
