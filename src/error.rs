//! Crate-wide error type and the policy each variant carries.
//!
//! Every stage of the pipeline returns one of these variants. The policy
//! each carries (surfaced to the caller, folded into a failing `TestResult`,
//! or only logged) is documented on the variant and enforced by the
//! orchestrator, not by the error type itself.

/// Errors produced by any pipeline stage.
///
/// # Policy
///
/// | Variant | Policy |
/// |---|---|
/// | [`Error::Validation`] | surfaced to the caller (store adapter) |
/// | [`Error::NotFound`] | surfaced to the caller (store adapter) |
/// | [`Error::Store`] | surfaced to the caller (store adapter) |
/// | [`Error::Extract`] | folded into a failing `TestResult`; pipeline continues |
/// | [`Error::Config`] | fatal to the submission; remaining tests also fail |
/// | [`Error::Sandbox`] | folded into a failing `TestResult`; pipeline continues |
/// | [`Error::Cleanup`] | logged only, never surfaced |
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A question failed its creation invariant (empty title/description,
    /// level zero, or no tests).
    #[error("Question must contain title & description & level & at least one test")]
    Validation,

    /// The question store has no document for the given id.
    #[error("question not found: {0}")]
    NotFound(String),

    /// The question store itself failed (connection, decode, etc.).
    #[error("question store error: {0}")]
    Store(String),

    /// The code introspector could not locate a function name or return
    /// type in the submitted source.
    #[error("{0}")]
    Extract(String),

    /// The sandbox runner could not resolve cluster credentials or other
    /// required configuration.
    #[error("{0}")]
    Config(String),

    /// Pod creation, copy, exec, or delete failed.
    #[error("{0}")]
    Sandbox(String),

    /// Workspace or pod teardown failed. Never propagated; only logged.
    #[error("cleanup failed: {0}")]
    Cleanup(String),

    /// Filesystem I/O failure while staging a workspace.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
