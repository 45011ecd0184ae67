//! Workspace Stager: lays out a per-test directory tree containing the
//! submission source and its synthesized harness, ready to be copied
//! into a sandbox.
//!
//! Grounded on `runTestJava`/`runTestPython`'s `os.MkdirAll` +
//! `defer os.RemoveAll("...")`: this module's [`WorkspaceGuard`] is the
//! `Drop`-based equivalent of that `defer`, guaranteeing the directory
//! is removed on every exit path — including a panic unwinding through
//! the stage, which a plain `.ok()`-on-cleanup call would miss.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::model::Language;

/// An on-disk workspace staged for exactly one test run.
///
/// Removes its directory tree on drop; cleanup failures are logged via
/// [`crate::error::Error::Cleanup`] and never propagated (`Drop` cannot
/// return a `Result`, which is the structural reason this policy holds).
pub struct WorkspaceGuard {
    root: PathBuf,
    /// Path `kube::api::Attach`-style staging should copy into the pod.
    pub stage_path: PathBuf,
    /// Absolute source-file path, for reference/logging.
    pub source_file: PathBuf,
    /// Absolute harness-file path, for reference/logging.
    pub harness_file: PathBuf,
}

impl WorkspaceGuard {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    error = %crate::error::Error::Cleanup(e.to_string()),
                    path = %self.root.display(),
                    "failed to remove workspace directory"
                );
            }
        } else {
            debug!(path = %self.root.display(), "removed workspace directory");
        }
    }
}

/// Stages a workspace under `base_dir` for one (language, submission,
/// harness) pair, named with a fresh [`Uuid`] to avoid collisions
/// between concurrently-running tests.
///
/// Python layout: `<base>/my_tests-<uid>/func.py`,
/// `<base>/my_tests-<uid>/test_func.py`.
/// Java layout: `<base>/src-<uid>/main/java/Main.java`,
/// `<base>/src-<uid>/test/java/MainTest.java`.
pub fn stage(
    base_dir: &Path,
    language: Language,
    submission_src: &str,
    harness_src: &str,
) -> Result<WorkspaceGuard> {
    let uid = Uuid::new_v4();
    match language {
        Language::Python => stage_python(base_dir, uid, submission_src, harness_src),
        Language::Java => stage_java(base_dir, uid, submission_src, harness_src),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn stage_python(
    base_dir: &Path,
    uid: Uuid,
    submission_src: &str,
    harness_src: &str,
) -> Result<WorkspaceGuard> {
    let root = base_dir.join(format!("my_tests-{uid}"));
    std::fs::create_dir_all(&root)?;

    let source_file = root.join("func.py");
    let harness_file = root.join("test_func.py");
    write_file(&source_file, submission_src)?;
    write_file(&harness_file, harness_src)?;

    debug!(path = %root.display(), "staged python workspace");
    Ok(WorkspaceGuard {
        stage_path: root.clone(),
        source_file,
        harness_file,
        root,
    })
}

fn stage_java(
    base_dir: &Path,
    uid: Uuid,
    submission_src: &str,
    harness_src: &str,
) -> Result<WorkspaceGuard> {
    let root = base_dir.join(format!("src-{uid}"));
    let source_file = root.join("main/java/Main.java");
    let harness_file = root.join("test/java/MainTest.java");
    write_file(&source_file, submission_src)?;
    write_file(&harness_file, harness_src)?;

    debug!(path = %root.display(), "staged java workspace");
    Ok(WorkspaceGuard {
        stage_path: root.clone(),
        source_file,
        harness_file,
        root,
    })
}
