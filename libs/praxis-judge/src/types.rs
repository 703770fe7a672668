use serde::{Deserialize, Serialize};

/// A single test case supplied by the caller. Immutable for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: u32,
    pub input: String,
    pub expected_output: String,
}

/// Canonical classification of one test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Passed,
    Failed,
    CompilationError,
    RuntimeError,
    Timeout,
}

/// Per-test result delivered to the caller.
///
/// Invariant: the orchestrator produces exactly one outcome per test case,
/// and `outcomes[i]` always corresponds to `tests[i]` regardless of the
/// order in which the backend finished the jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test_id: u32,
    pub status: OutcomeStatus,
    pub passed: bool,
    pub actual_output: String,
    pub error: Option<String>,
    pub time_secs: Option<f64>,
}

/// Ordered outcomes plus aggregate counts for one judged run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<TestOutcome>,
    pub passed: usize,
    pub total: usize,
}

impl RunReport {
    pub fn new(outcomes: Vec<TestOutcome>) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let total = outcomes.len();
        Self {
            outcomes,
            passed,
            total,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(test_id: u32, status: OutcomeStatus) -> TestOutcome {
        TestOutcome {
            test_id,
            status,
            passed: status == OutcomeStatus::Passed,
            actual_output: String::new(),
            error: None,
            time_secs: None,
        }
    }

    #[test]
    fn report_counts_passed_outcomes() {
        let report = RunReport::new(vec![
            outcome(1, OutcomeStatus::Passed),
            outcome(2, OutcomeStatus::Failed),
            outcome(3, OutcomeStatus::Passed),
        ]);

        assert_eq!(report.passed, 2);
        assert_eq!(report.total, 3);
        assert!(!report.all_passed());
    }

    #[test]
    fn empty_report_counts_as_all_passed() {
        let report = RunReport::new(Vec::new());
        assert_eq!(report.total, 0);
        assert!(report.all_passed());
    }
}
