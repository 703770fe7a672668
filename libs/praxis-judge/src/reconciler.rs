/// Result Reconciler - Terminal Status Classification
///
/// **Core Responsibility:**
/// Map each raw terminal submission onto a canonical outcome and restore
/// original test ordering.
///
/// **Critical Properties:**
/// - Pure: same (test, raw submission) always yields the same outcome
/// - Execution failures are outcomes, never errors
/// - Knows nothing about HTTP, tokens, or polling
use crate::backend::{
    Submission, STATUS_ACCEPTED, STATUS_COMPILE_ERROR, STATUS_TIME_LIMIT, STATUS_WRONG_ANSWER,
};
use crate::codec;
use crate::types::{OutcomeStatus, TestCase, TestOutcome};

/// Comparison rule shared with the content authors: leading and trailing
/// whitespace is insignificant, internal whitespace and case are not.
fn normalize(output: &str) -> &str {
    output.trim()
}

pub fn reconcile(test: &TestCase, raw: &Submission) -> TestOutcome {
    let stdout = codec::decode(raw.stdout.as_deref()).unwrap_or_default();
    let time_secs = raw.time.as_deref().and_then(|t| t.parse::<f64>().ok());

    let (status, error) = match raw.status.id {
        STATUS_TIME_LIMIT => {
            let detail = codec::decode(raw.message.as_deref())
                .unwrap_or_else(|| raw.status.description.clone());
            (OutcomeStatus::Timeout, Some(detail))
        }
        STATUS_COMPILE_ERROR => {
            let detail = codec::decode(raw.compile_output.as_deref())
                .or_else(|| codec::decode(raw.message.as_deref()))
                .unwrap_or_else(|| raw.status.description.clone());
            (OutcomeStatus::CompilationError, Some(detail))
        }
        STATUS_ACCEPTED | STATUS_WRONG_ANSWER => {
            if normalize(&stdout) == normalize(&test.expected_output) {
                (OutcomeStatus::Passed, None)
            } else {
                (OutcomeStatus::Failed, None)
            }
        }
        _ => {
            let detail = codec::decode(raw.stderr.as_deref())
                .or_else(|| codec::decode(raw.message.as_deref()))
                .unwrap_or_else(|| raw.status.description.clone());
            (OutcomeStatus::RuntimeError, Some(detail))
        }
    };

    TestOutcome {
        test_id: test.id,
        passed: status == OutcomeStatus::Passed,
        status,
        actual_output: stdout,
        error,
        time_secs,
    }
}

/// Reconcile by index. Both slices come from the same dispatch, so their
/// lengths match by the dispatcher/poller contracts.
pub fn reconcile_all(tests: &[TestCase], raws: &[Submission]) -> Vec<TestOutcome> {
    debug_assert_eq!(tests.len(), raws.len());
    tests
        .iter()
        .zip(raws)
        .map(|(test, raw)| reconcile(test, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StatusInfo;

    fn test_case(input: &str, expected: &str) -> TestCase {
        TestCase {
            id: 1,
            input: input.to_string(),
            expected_output: expected.to_string(),
        }
    }

    fn submission(status_id: u32) -> Submission {
        Submission {
            token: None,
            status: StatusInfo {
                id: status_id,
                description: format!("status {}", status_id),
            },
            stdout: None,
            stderr: None,
            compile_output: None,
            message: None,
            time: None,
            memory: None,
        }
    }

    fn accepted_with_stdout(stdout: &str) -> Submission {
        let mut raw = submission(STATUS_ACCEPTED);
        raw.stdout = Some(codec::encode(stdout));
        raw.time = Some("0.023".to_string());
        raw
    }

    #[test]
    fn echoed_input_passes() {
        let outcome = reconcile(&test_case("5", "5"), &accepted_with_stdout("5\n"));
        assert_eq!(outcome.status, OutcomeStatus::Passed);
        assert!(outcome.passed);
        assert_eq!(outcome.actual_output, "5\n");
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn wrong_output_fails() {
        let outcome = reconcile(&test_case("5", "5"), &accepted_with_stdout("6"));
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(!outcome.passed);
        assert_eq!(outcome.actual_output, "6");
    }

    #[test]
    fn surrounding_whitespace_is_insignificant() {
        let outcome = reconcile(
            &test_case("x", "line1\nline2"),
            &accepted_with_stdout("  line1\nline2  \n"),
        );
        assert_eq!(outcome.status, OutcomeStatus::Passed);
    }

    #[test]
    fn internal_whitespace_and_case_are_significant() {
        let outcome = reconcile(&test_case("x", "a b"), &accepted_with_stdout("a  b"));
        assert_eq!(outcome.status, OutcomeStatus::Failed);

        let outcome = reconcile(&test_case("x", "Hello"), &accepted_with_stdout("hello"));
        assert_eq!(outcome.status, OutcomeStatus::Failed);
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let mut raw = submission(11);
        raw.stderr = Some(codec::encode(
            "Traceback (most recent call last):\nZeroDivisionError: division by zero",
        ));
        let outcome = reconcile(&test_case("1", "1"), &raw);
        assert_eq!(outcome.status, OutcomeStatus::RuntimeError);
        assert!(!outcome.passed);
        assert!(outcome.error.unwrap().contains("ZeroDivisionError"));
    }

    #[test]
    fn invalid_syntax_is_a_compilation_error() {
        let mut raw = submission(STATUS_COMPILE_ERROR);
        raw.compile_output = Some(codec::encode("SyntaxError: invalid syntax"));
        let outcome = reconcile(&test_case("1", "1"), &raw);
        assert_eq!(outcome.status, OutcomeStatus::CompilationError);
        assert_eq!(outcome.error.as_deref(), Some("SyntaxError: invalid syntax"));
    }

    #[test]
    fn backend_time_limit_is_a_timeout() {
        let outcome = reconcile(&test_case("1", "1"), &submission(STATUS_TIME_LIMIT));
        assert_eq!(outcome.status, OutcomeStatus::Timeout);
        assert!(!outcome.passed);
        assert_eq!(outcome.error.as_deref(), Some("status 5"));
    }

    #[test]
    fn synthesized_timeout_reports_the_polling_deadline() {
        let raw = Submission::synthetic_timeout("tok".to_string());
        let outcome = reconcile(&test_case("1", "1"), &raw);
        assert_eq!(outcome.status, OutcomeStatus::Timeout);
        assert!(outcome.error.unwrap().contains("polling deadline"));
    }

    #[test]
    fn runtime_error_falls_back_to_status_description() {
        let outcome = reconcile(&test_case("1", "1"), &submission(13));
        assert_eq!(outcome.status, OutcomeStatus::RuntimeError);
        assert_eq!(outcome.error.as_deref(), Some("status 13"));
    }

    #[test]
    fn execution_time_is_parsed_when_present() {
        let outcome = reconcile(&test_case("5", "5"), &accepted_with_stdout("5"));
        assert_eq!(outcome.time_secs, Some(0.023));
    }

    #[test]
    fn reconcile_all_preserves_order_and_length() {
        let tests: Vec<TestCase> = (1..=4)
            .map(|i| TestCase {
                id: i,
                input: i.to_string(),
                expected_output: i.to_string(),
            })
            .collect();
        let raws: Vec<Submission> = tests
            .iter()
            .map(|t| accepted_with_stdout(&t.input))
            .collect();

        let outcomes = reconcile_all(&tests, &raws);

        assert_eq!(outcomes.len(), 4);
        for (test, outcome) in tests.iter().zip(&outcomes) {
            assert_eq!(outcome.test_id, test.id);
            assert!(outcome.passed);
        }
    }
}
