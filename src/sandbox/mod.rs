//! Sandbox Runner: the trait pair an ephemeral execution backend
//! implements, plus the concrete Kubernetes-pod provider and an
//! in-memory fake used by tests.
//!
//! Grounded on the `Sandbox`/`SandboxProvider` pair this crate's
//! teacher defines for its Docker/SSH/local providers, trimmed to what
//! this pipeline needs: one pod per test, a single `exec`, a tar-based
//! `upload`, and `terminate`. Streaming output (`exec_stream`) is
//! dropped — there is no progress-streaming surface in this pipeline.

pub mod fake;
pub mod kube;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Language;

/// Lifecycle state of a sandbox, mirroring the pod phases the original
/// polls (`Pending`/`Running`) plus the two ends of the lifecycle this
/// crate also needs to express (`Creating` before the API call returns,
/// `Terminated` once deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxStatus {
    Creating,
    Pending,
    Running,
    Terminated,
}

/// The result of running the test command inside a sandbox.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    /// Combined stdout+stderr, the shape the classifier scans — the
    /// original's `cmd.CombinedOutput()` does the same merge.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// An isolated, ephemeral execution environment for exactly one test.
#[async_trait]
pub trait Sandbox: Send + Sync {
    fn id(&self) -> &str;

    /// Polls the current lifecycle state.
    async fn status(&self) -> Result<SandboxStatus>;

    /// Copies a local directory tree into the sandbox, at `remote`.
    async fn upload(&self, local: &Path, remote: &str) -> Result<()>;

    /// Runs the language's test command and returns its output.
    async fn exec(&self, cmd: &[String]) -> Result<ExecResult>;

    /// Tears the sandbox down. Idempotent: calling this twice, or never
    /// (leaving it to a `Drop`-based guard), must not panic or leak.
    async fn terminate(&self) -> Result<()>;
}

/// A type-erased sandbox for dynamic dispatch, since the orchestrator
/// only ever holds one concrete provider at a time but must stay
/// generic over which one.
pub type DynSandbox = Box<dyn Sandbox>;

/// Creates sandboxes on demand, one per test.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Creates and waits for a sandbox to become ready for `language`.
    async fn create(&self, language: Language) -> Result<DynSandbox>;

    fn name(&self) -> &'static str;
}
