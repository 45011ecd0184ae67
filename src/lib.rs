//! # crucible
//!
//! Evaluates user-submitted solutions to programming problems by
//! synthesizing a language-appropriate test driver around the
//! submission, executing it inside an ephemeral, per-test cluster
//! sandbox pod, and classifying the result into a structured
//! pass/fail report.
//!
//! ## Pipeline
//!
//! For each test of a submitted `(function_code, question_id, language)`
//! triple, the [`orchestrator`] drives:
//!
//! 1. [`introspect`] — extract the submission's callable name (and, for
//!    Java, its declared return type) via shallow pattern matching.
//! 2. [`literal`] — translate the question's canonical, JSON-like test
//!    literals into the destination language's literal syntax.
//! 3. [`harness`] — synthesize a test-driver source file that invokes
//!    the submission and asserts against the translated expected output.
//! 4. [`workspace`] — materialize submission + harness into a uniquely
//!    named local directory, guaranteed to be removed afterward.
//! 5. [`sandbox`] — provision a per-test sandbox pod
//!    ([`sandbox::kube::KubeProvider`]), upload the workspace, run the
//!    language's test command, collect combined output, tear the pod
//!    down.
//! 6. [`classify`] — parse that output into a pass/fail verdict, an
//!    observed value on failure, and a diagnosis (compilation error,
//!    runtime error, assertion mismatch, or generic failure).
//!
//! ## External collaborators
//!
//! The core depends on two traits wired in by the caller: [`store::QuestionStore`]
//! (the question catalog) and [`sandbox::SandboxProvider`] (the cluster).
//! An HTTP surface, process bootstrap, and persistent question storage
//! are out of this crate's scope; [`store::InMemoryQuestionStore`] and
//! [`sandbox::fake`] stand in for tests and local development.
//!
//! ## Configuration
//!
//! Pipeline tunables (concurrency, timeouts, pod-readiness polling,
//! cluster namespace) are loaded from TOML via [`config::load_config`];
//! see [`config::PipelineConfig`] for the schema.

pub mod classify;
pub mod config;
pub mod error;
pub mod harness;
pub mod introspect;
pub mod language;
pub mod literal;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod sandbox;
pub mod store;
pub mod workspace;

pub use config::{PipelineConfig, load_config, load_config_str};
pub use error::{Error, Result};
pub use model::{ErrorLine, Language, Question, Submission, Test, TestResult};
pub use orchestrator::Orchestrator;
pub use report::print_summary;
pub use sandbox::{Sandbox, SandboxProvider};
pub use store::QuestionStore;
