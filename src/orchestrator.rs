//! Test Orchestrator: for one submission, loads its question, drives the
//! per-test pipeline (introspect → translate → synthesize → stage → run
//! in a sandbox → classify) for each test, and assembles the ordered
//! list of [`TestResult`]s.
//!
//! Grounded on `RunTests`'s per-test loop in `runTests.service.go`, with
//! the teacher's bounded-concurrency fan-out (its `Scheduler` +
//! per-batch spawn pattern) adapted from per-sandbox-batch parallelism
//! to per-test parallelism, since this pipeline creates one pod per test
//! rather than reusing a pool (spec §4.7, §5).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::language::{self, Introspected};
use crate::model::{Language, Submission, Test, TestResult};
use crate::sandbox::SandboxProvider;
use crate::store::QuestionStore;
use crate::workspace;

/// Coordinates one submission's evaluation against its question's tests.
pub struct Orchestrator {
    config: PipelineConfig,
    store: Arc<dyn QuestionStore>,
    sandbox_provider: Arc<dyn SandboxProvider>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn QuestionStore>,
        sandbox_provider: Arc<dyn SandboxProvider>,
    ) -> Self {
        Self {
            config,
            store,
            sandbox_provider,
        }
    }

    /// Evaluates `submission` against its question's tests, returning one
    /// [`TestResult`] per test, ordered by test number.
    ///
    /// Loading the question is the only failure mode that aborts the
    /// whole run ([`Error::NotFound`] / [`Error::Store`], per spec §7);
    /// every other failure — introspection, translation, staging, or the
    /// sandbox itself — is folded into that test's `TestResult` and the
    /// remaining tests still run.
    pub async fn run(&self, submission: &Submission, workspace_root: &Path) -> Result<Vec<TestResult>> {
        let question = self.store.get(&submission.question_id).await?;
        info!(question = %question.id, tests = question.tests.len(), "starting submission evaluation");

        let introspected = match language::introspect(submission.language, &submission.function_code) {
            Ok(introspected) => introspected,
            Err(e) => {
                // Deterministic for every test on this submission: one
                // ExtractError fails the whole run, but each test still
                // gets its own TestResult (spec §7's "pipeline continues").
                let message = e.to_string();
                return Ok(question
                    .tests
                    .iter()
                    .enumerate()
                    .map(|(i, test)| classify(i + 1, test, submission.language, Err(message.as_str())))
                    .collect());
            }
        };

        let max_parallel = self.config.max_parallel.max(1);
        let semaphore = Arc::new(Semaphore::new(max_parallel));
        let mut results: Vec<TestResult> = stream::iter(question.tests.iter().enumerate())
            .map(|(index, test)| {
                let semaphore = Arc::clone(&semaphore);
                let introspected = introspected.clone();
                async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                    let test_number = index + 1;
                    let outcome = self
                        .run_single_test(submission, test, &introspected, workspace_root)
                        .await;
                    let result = match &outcome {
                        Ok(output) => classify(test_number, test, submission.language, Ok(output.as_str())),
                        Err(e) => {
                            let message = e.to_string();
                            classify(test_number, test, submission.language, Err(message.as_str()))
                        }
                    };
                    info!(test = test_number, passed = result.passed, "test evaluated");
                    result
                }
            })
            .buffer_unordered(max_parallel)
            .collect()
            .await;

        results.sort_by_key(|r| r.test_number);
        Ok(results)
    }

    /// Runs one test's pipeline: synthesize the harness, stage a
    /// workspace, provision a sandbox, upload, execute the language's
    /// test command, and tear the sandbox down. Returns the sandbox's
    /// combined stdout+stderr for the classifier, or the error that
    /// stopped this test short.
    async fn run_single_test(
        &self,
        submission: &Submission,
        test: &Test,
        introspected: &Introspected,
        workspace_root: &Path,
    ) -> Result<String> {
        let harness_src = language::synthesize_harness(
            submission.language,
            introspected,
            &test.input,
            &test.expected_output,
        );
        let guard = workspace::stage(
            workspace_root,
            submission.language,
            &submission.function_code,
            &harness_src,
        )?;

        let sandbox = self.sandbox_provider.create(submission.language).await?;
        let remote_dir = language::remote_dir(submission.language);
        sandbox.upload(guard.stage_path.as_path(), remote_dir).await?;

        let cmd = language::test_command(submission.language);
        let timeout = Duration::from_secs(self.config.test_timeout_secs);
        let exec_result = tokio::time::timeout(timeout, sandbox.exec(&cmd))
            .await
            .map_err(|_| Error::Sandbox("test execution timed out".to_string()))??;

        if let Err(e) = sandbox.terminate().await {
            warn!(error = %e, "failed to terminate sandbox after test run");
        }

        Ok(exec_result.combined_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::fake::ScriptedSandbox;
    use crate::sandbox::{DynSandbox, ExecResult};
    use crate::store::InMemoryQuestionStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A provider that replays a fixed sequence of [`ExecResult`]s, one
    /// per call to `create`, in order — enough to drive the orchestrator
    /// deterministically without a cluster or a local toolchain.
    struct ScriptedProvider {
        outputs: Vec<ExecResult>,
        next: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(outputs: Vec<ExecResult>) -> Self {
            Self {
                outputs,
                next: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SandboxProvider for ScriptedProvider {
        async fn create(&self, _language: Language) -> Result<DynSandbox> {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            let result = self.outputs[i % self.outputs.len()].clone();
            Ok(Box::new(ScriptedSandbox::new(format!("scripted-{i}"), result)))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn exec_ok(stdout: &str) -> ExecResult {
        ExecResult {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    async fn setup_store(tests: Vec<Test>) -> (Arc<InMemoryQuestionStore>, String) {
        let store = Arc::new(InMemoryQuestionStore::new());
        let id = store
            .create(
                "Sum".to_string(),
                "Sum an array".to_string(),
                1,
                tests,
                "int[]".to_string(),
                "int".to_string(),
            )
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn e1_passing_python_submission() {
        let (store, id) = setup_store(vec![Test::new("[1,2,3]", "6")]).await;
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok("1 passed in 0.01s")]));
        let orchestrator = Orchestrator::new(PipelineConfig::default(), store, provider);

        let submission = Submission {
            function_code: "def sum_all(a):\n    return sum(a)\n".to_string(),
            question_id: id,
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        let results = orchestrator.run(&submission, tmp.path()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert_eq!(results[0].output, "6");
        assert_eq!(results[0].comments, "Test passed");
    }

    #[tokio::test]
    async fn e2_failing_python_submission_reports_observed_value() {
        let (store, id) = setup_store(vec![Test::new("[1,2,3]", "6")]).await;
        let out = "FAILED test_func.py::test - AssertionError: Expected 6 but got 0\nassert 0 == 6";
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok(out)]));
        let orchestrator = Orchestrator::new(PipelineConfig::default(), store, provider);

        let submission = Submission {
            function_code: "def sum_all(a):\n    return 0\n".to_string(),
            question_id: id,
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        let results = orchestrator.run(&submission, tmp.path()).await.unwrap();

        assert!(!results[0].passed);
        assert_eq!(results[0].output, "0");
        assert!(results[0].comments.contains("output indicates failure"));
    }

    #[tokio::test]
    async fn introspection_failure_fails_every_test_but_returns_ok() {
        let (store, id) = setup_store(vec![Test::new("1", "1"), Test::new("2", "2")]).await;
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok("unused")]));
        let orchestrator = Orchestrator::new(PipelineConfig::default(), store, provider);

        let submission = Submission {
            function_code: "x = 1\n".to_string(), // no `def`, introspection fails
            question_id: id,
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        let results = orchestrator.run(&submission, tmp.path()).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.passed));
        assert!(results.iter().all(|r| !r.comments.is_empty()));
        assert_eq!(results[0].test_number, 1);
        assert_eq!(results[1].test_number, 2);
    }

    #[tokio::test]
    async fn unknown_question_id_is_not_found() {
        let store = Arc::new(InMemoryQuestionStore::new());
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok("unused")]));
        let orchestrator = Orchestrator::new(PipelineConfig::default(), store, provider);

        let submission = Submission {
            function_code: "def f(): pass".to_string(),
            question_id: "does-not-exist".to_string(),
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        let err = orchestrator.run(&submission, tmp.path()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn results_are_returned_in_test_index_order_under_concurrency() {
        let tests = vec![
            Test::new("1", "1"),
            Test::new("2", "2"),
            Test::new("3", "3"),
            Test::new("4", "4"),
            Test::new("5", "5"),
        ];
        let (store, id) = setup_store(tests).await;
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok("1 passed")]));
        let mut config = PipelineConfig::default();
        config.max_parallel = 4;
        let orchestrator = Orchestrator::new(config, store, provider);

        let submission = Submission {
            function_code: "def f(a):\n    return a\n".to_string(),
            question_id: id,
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        let results = orchestrator.run(&submission, tmp.path()).await.unwrap();

        let numbers: Vec<usize> = results.iter().map(|r| r.test_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn workspace_does_not_outlive_the_run() {
        let (store, id) = setup_store(vec![Test::new("1", "1")]).await;
        let provider = Arc::new(ScriptedProvider::new(vec![exec_ok("1 passed")]));
        let orchestrator = Orchestrator::new(PipelineConfig::default(), store, provider);

        let submission = Submission {
            function_code: "def f(a):\n    return a\n".to_string(),
            question_id: id,
            language: Language::Python,
        };
        let tmp = tempfile::tempdir().unwrap();
        orchestrator.run(&submission, tmp.path()).await.unwrap();

        let leftover: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert!(leftover.is_empty(), "workspace directory was not cleaned up");
    }
}
