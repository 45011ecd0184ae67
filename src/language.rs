//! Closed, tagged-enum dispatch over [`Language`] — "polymorphism over
//! language" (spec.md §9): adding a language means adding a
//! [`Language`] variant and one match arm here, not reflection or
//! string matching scattered through the pipeline.

use crate::error::Result;
use crate::harness;
use crate::introspect;
use crate::model::Language;
use crate::sandbox::kube::{image_for as image_for_language, remote_dir_for, test_command_for};

/// A submission's extracted identity: the name the harness calls, and
/// (for Java only) the declared return type / access modifier.
#[derive(Debug, Clone)]
pub struct Introspected {
    pub function_name: String,
    /// `"python"` for Python (introspection is a no-op there); the
    /// declared return type/modifier string for Java (e.g. `"int[]"`).
    pub return_type: String,
}

/// Extracts the callable's name (and, for Java, its return type) from
/// submission source, per [`crate::introspect`].
pub fn introspect(language: Language, submission_src: &str) -> Result<Introspected> {
    match language {
        Language::Python => Ok(Introspected {
            function_name: introspect::function_name_python(submission_src)?,
            return_type: introspect::return_type_python(submission_src).to_string(),
        }),
        Language::Java => {
            let return_type = introspect::return_type_java(submission_src)?;
            let function_name = introspect::function_name_java(submission_src, &return_type)?;
            Ok(Introspected {
                function_name,
                return_type,
            })
        }
    }
}

/// Synthesizes the harness source for one test, per [`crate::harness`].
pub fn synthesize_harness(
    language: Language,
    introspected: &Introspected,
    input: &str,
    expected_output: &str,
) -> String {
    match language {
        Language::Python => {
            harness::synthesize_python(&introspected.function_name, input, expected_output)
        }
        Language::Java => harness::synthesize_java(
            &introspected.return_type,
            &introspected.function_name,
            input,
            expected_output,
        ),
    }
}

/// The pod image this language runs in.
pub fn image_for(language: Language) -> &'static str {
    image_for_language(language)
}

/// The in-pod directory a workspace is uploaded to.
pub fn remote_dir(language: Language) -> &'static str {
    remote_dir_for(language)
}

/// The in-pod command that runs the staged tests.
pub fn test_command(language: Language) -> Vec<String> {
    test_command_for(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_round_trip() {
        let introspected = introspect(Language::Python, "def add(a, b):\n    return a + b").unwrap();
        assert_eq!(introspected.function_name, "add");
        let src = synthesize_harness(Language::Python, &introspected, "1,2", "3");
        assert!(src.contains("add(1,2)"));
    }

    #[test]
    fn java_round_trip() {
        let src_code = "public static int add(int a, int b) { return a + b; }";
        let introspected = introspect(Language::Java, src_code).unwrap();
        assert_eq!(introspected.function_name, "add");
        assert_eq!(introspected.return_type, "int");
        let harness_src = synthesize_harness(Language::Java, &introspected, "1,2", "3");
        assert!(harness_src.contains("assertEquals(3, result)"));
    }

    #[test]
    fn dispatch_table_covers_both_languages() {
        for language in [Language::Python, Language::Java] {
            assert!(!image_for(language).is_empty());
            assert!(!remote_dir(language).is_empty());
            assert!(!test_command(language).is_empty());
        }
    }
}
