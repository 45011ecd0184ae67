//! Core data types: the question catalog shape, a submission, and the
//! per-test result record the pipeline produces.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single test case in a question's canonical, language-independent
/// literal syntax (see the grammar in spec §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub input: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
}

impl Test {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// An immutable question record from the catalog.
///
/// Construction is the only path that can produce a `Question`, and it
/// enforces the creation invariant: non-empty title/description, a
/// positive level, and at least one test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: u32,
    pub tests: Vec<Test>,
    #[serde(rename = "inputTypes")]
    pub input_types: String,
    #[serde(rename = "outputType")]
    pub output_type: String,
}

impl Question {
    /// Builds a question, rejecting an empty title/description, a zero
    /// level, or an empty test list with [`Error::Validation`].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        level: u32,
        tests: Vec<Test>,
        input_types: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Result<Self> {
        let title = title.into();
        let description = description.into();
        if title.is_empty() || description.is_empty() || level == 0 || tests.is_empty() {
            return Err(Error::Validation);
        }
        Ok(Self {
            id: id.into(),
            title,
            description,
            level,
            tests,
            input_types: input_types.into(),
            output_type: output_type.into(),
        })
    }
}

/// The language a submission is written in.
///
/// A closed, tagged variant: adding a language means adding a variant
/// and a matching entry in [`crate::language`]'s dispatch table, not
/// reflection or string matching scattered through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
        }
    }
}

/// A transient request to evaluate a candidate function body against a
/// question's tests.
#[derive(Debug, Clone)]
pub struct Submission {
    pub function_code: String,
    pub question_id: String,
    pub language: Language,
}

/// One line of a reported compilation/runtime error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLine {
    pub line: String,
    pub message: String,
}

/// The outcome of running one test, after classification.
///
/// On a pass, `output == expected_output`. On a failure, `output` is the
/// observed value parsed from the harness's "but got ..." line, or empty
/// if it could not be parsed. `comments` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_number: usize,
    pub passed: bool,
    pub output: String,
    pub input: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
    pub comments: String,
    pub errors: Vec<ErrorLine>,
}
