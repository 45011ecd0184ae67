//! An in-memory sandbox used by tests and local development.
//!
//! Runs the staged workspace as a real local process rather than inside
//! a pod — grounded on the teacher's `ProcessProvider`, the simplest of
//! its providers, kept here purely as a test double so the orchestrator
//! and classifier can be exercised without a cluster. It is not wired
//! into the CLI binary's default path; the default there is
//! [`super::kube::KubeProvider`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;

use crate::error::{Error, Result};
use crate::model::Language;

use super::{DynSandbox, ExecResult, Sandbox, SandboxProvider, SandboxStatus};

/// Creates [`FakeSandbox`]es backed by a local temp directory instead of
/// a pod.
#[derive(Default)]
pub struct FakeProvider;

#[async_trait]
impl SandboxProvider for FakeProvider {
    async fn create(&self, language: Language) -> Result<DynSandbox> {
        let dir = tempfile::tempdir().map_err(Error::Io)?;
        Ok(Box::new(FakeSandbox {
            id: format!("fake-{language}"),
            dir: Mutex::new(dir),
            language,
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A sandbox backed by a local temp directory; `upload` copies files in
/// instead of streaming a tar archive over an attach session, and
/// `exec` shells out to the host's own `pytest`/`mvn` if present.
pub struct FakeSandbox {
    id: String,
    dir: Mutex<tempfile::TempDir>,
    language: Language,
}

#[async_trait]
impl Sandbox for FakeSandbox {
    fn id(&self) -> &str {
        &self.id
    }

    async fn status(&self) -> Result<SandboxStatus> {
        Ok(SandboxStatus::Running)
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let dest = self.dir.lock().unwrap().path().join(remote.trim_start_matches('/'));
        copy_dir_all(local, &dest)?;
        Ok(())
    }

    async fn exec(&self, cmd: &[String]) -> Result<ExecResult> {
        let (program, args) = cmd
            .split_first()
            .ok_or_else(|| Error::Sandbox("empty command".to_string()))?;
        let cwd = self.dir.lock().unwrap().path().to_path_buf();
        let output = TokioCommand::new(program)
            .args(args)
            .current_dir(&cwd)
            .output()
            .await
            .map_err(|e| Error::Sandbox(format!("failed to run {program}: {e}")))?;
        Ok(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn terminate(&self) -> Result<()> {
        Ok(())
    }
}

/// Recursively copies a directory tree, mirroring the teacher's
/// `provider::local::copy_dir_all` helper.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let target = dst.join(entry.file_name());
        if ty.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// An in-memory-only sandbox that never shells out at all — used where
/// tests need full control over the recorded exec output (e.g. feeding
/// known classifier fixtures) without depending on a local toolchain.
pub struct ScriptedSandbox {
    id: String,
    staged: Mutex<Vec<(PathBuf, String)>>,
    scripted_result: ExecResult,
}

impl ScriptedSandbox {
    pub fn new(id: impl Into<String>, scripted_result: ExecResult) -> Self {
        Self {
            id: id.into(),
            staged: Mutex::new(Vec::new()),
            scripted_result,
        }
    }

    pub fn staged_uploads(&self) -> Vec<(PathBuf, String)> {
        self.staged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sandbox for ScriptedSandbox {
    fn id(&self) -> &str {
        &self.id
    }

    async fn status(&self) -> Result<SandboxStatus> {
        Ok(SandboxStatus::Running)
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        self.staged
            .lock()
            .unwrap()
            .push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    async fn exec(&self, _cmd: &[String]) -> Result<ExecResult> {
        Ok(self.scripted_result.clone())
    }

    async fn terminate(&self) -> Result<()> {
        Ok(())
    }
}

/// Replays a fixed sequence of [`ExecResult`]s, one per call to
/// `create`, cycling once exhausted. Public so integration tests
/// outside this crate's source tree can drive the orchestrator against
/// scripted sandbox output without a cluster or a local toolchain.
pub struct ScriptedProvider {
    outputs: Vec<ExecResult>,
    next: std::sync::atomic::AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(outputs: Vec<ExecResult>) -> Self {
        Self {
            outputs,
            next: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SandboxProvider for ScriptedProvider {
    async fn create(&self, _language: Language) -> Result<DynSandbox> {
        let i = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let result = self.outputs[i % self.outputs.len()].clone();
        Ok(Box::new(ScriptedSandbox::new(format!("scripted-{i}"), result)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_provider_creates_running_sandbox() {
        let provider = FakeProvider;
        let sandbox = provider.create(Language::Python).await.unwrap();
        assert_eq!(sandbox.status().await.unwrap(), SandboxStatus::Running);
    }

    #[tokio::test]
    async fn scripted_sandbox_records_uploads_and_replays_result() {
        let sandbox = ScriptedSandbox::new(
            "s1",
            ExecResult {
                exit_code: 1,
                stdout: "got 5".to_string(),
                stderr: String::new(),
            },
        );
        let tmp = tempfile::tempdir().unwrap();
        sandbox.upload(tmp.path(), "/app/my_tests").await.unwrap();
        let result = sandbox.exec(&["pytest".to_string()]).await.unwrap();
        assert_eq!(result.stdout, "got 5");
        assert_eq!(sandbox.staged_uploads().len(), 1);
    }
}
