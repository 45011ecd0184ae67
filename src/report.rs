//! Non-streaming console summary: prints a pass/fail tally and each
//! failing test's diagnosis once a submission's full run has completed.
//!
//! Grounded on the teacher's `report::ConsoleReporter`, simplified: the
//! teacher's reporter is an event-driven trait (`on_test_start`,
//! `on_test_complete`, a live progress bar) because it streams results
//! as sandboxes finish. This pipeline has no streaming-progress surface
//! (spec §1 Non-goals), so the ambient-stack equivalent here is a single
//! free function called once the orchestrator's full result list is in
//! hand, not a trait implemented per reporting backend.

use crate::model::TestResult;

/// Prints a one-line summary followed by one line per failing test.
pub fn print_summary(question_title: &str, results: &[TestResult]) {
    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();
    let tally = if passed == total {
        console::style(format!("{passed}/{total} passed")).green().bold()
    } else {
        console::style(format!("{passed}/{total} passed")).red().bold()
    };
    println!("{question_title}: {tally}");
    for result in results.iter().filter(|r| !r.passed) {
        println!(
            "  {} test {}: {}",
            console::style("FAIL").red().bold(),
            result.test_number,
            console::style(&result.comments).dim()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Test;

    fn result(test_number: usize, passed: bool, comments: &str) -> TestResult {
        let test = Test::new("1", "1");
        TestResult {
            test_number,
            passed,
            output: "1".to_string(),
            input: test.input,
            expected_output: test.expected_output,
            comments: comments.to_string(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn summary_does_not_panic_on_empty_results() {
        print_summary("Empty Question", &[]);
    }

    #[test]
    fn summary_does_not_panic_on_mixed_results() {
        print_summary(
            "Sum",
            &[
                result(1, true, "Test passed"),
                result(2, false, "Test failed for input 1: output indicates failure: got 0"),
            ],
        );
    }
}
