/// Orchestrator - Top-Level Pipeline
///
/// Dispatch, poll when needed, reconcile. This module is the glue layer;
/// it knows nothing about chunk sizes, backoff, or status codes.
use crate::backend::{ExecutionBackend, HttpBackend};
use crate::config::JudgeConfig;
use crate::dispatcher::{self, Dispatch, DispatchMode};
use crate::poller;
use crate::reconciler;
use crate::types::{RunReport, TestCase};
use anyhow::Result;
use tracing::info;
use uuid::Uuid;

pub struct Orchestrator<B> {
    backend: B,
    config: JudgeConfig,
}

impl Orchestrator<HttpBackend> {
    /// Orchestrator over the production HTTP backend.
    pub fn from_config(config: JudgeConfig) -> Result<Self> {
        let backend = HttpBackend::new(config.clone())?;
        Ok(Self::new(backend, config))
    }
}

impl<B: ExecutionBackend> Orchestrator<B> {
    pub fn new(backend: B, config: JudgeConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Run `source` against every test case and return outcomes in input
    /// order. Execution failures (wrong answer, crash, timeout) are normal
    /// outcomes; only dispatcher-level transport or rejection failures
    /// surface as errors.
    pub async fn run_tests(
        &self,
        source: &str,
        tests: &[TestCase],
        mode: DispatchMode,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, tests = tests.len(), ?mode, "starting judged run");

        let raws =
            match dispatcher::dispatch(&self.backend, &self.config, source, tests, mode).await? {
                Dispatch::Completed(raws) => raws,
                Dispatch::Submitted(tokens) => {
                    poller::poll(&self.backend, &self.config, &tokens).await
                }
            };

        let outcomes = reconciler::reconcile_all(tests, &raws);
        let report = RunReport::new(outcomes);
        info!(%run_id, passed = report.passed, total = report.total, "judged run complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::types::OutcomeStatus;
    use std::time::Duration;

    fn orchestrator() -> Orchestrator<FakeBackend> {
        let mut config = JudgeConfig::new("http://judge.test");
        config.wall_clock_timeout = Duration::from_secs(10);
        Orchestrator::new(FakeBackend::new(), config)
    }

    fn echo_tests(n: u32) -> Vec<TestCase> {
        (1..=n)
            .map(|i| TestCase {
                id: i,
                input: i.to_string(),
                expected_output: i.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_test_list_yields_empty_report() {
        let orchestrator = orchestrator();
        for mode in [DispatchMode::Sync, DispatchMode::Batch] {
            let report = orchestrator.run_tests("code", &[], mode).await.unwrap();
            assert_eq!(report.total, 0);
            assert!(report.outcomes.is_empty());
        }
    }

    #[tokio::test]
    async fn sync_run_reports_ordered_outcomes() {
        let orchestrator = orchestrator();
        let mut tests = echo_tests(3);
        tests[1].expected_output = "not what the echo prints".to_string();

        let report = orchestrator
            .run_tests("code", &tests, DispatchMode::Sync)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        let ids: Vec<u32> = report.outcomes.iter().map(|o| o.test_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_run_polls_twenty_five_tests_across_two_chunks() {
        let orchestrator = orchestrator();
        let tests = echo_tests(25);

        let report = orchestrator
            .run_tests("code", &tests, DispatchMode::Batch)
            .await
            .unwrap();

        assert_eq!(report.total, 25);
        assert!(report.all_passed());
        let ids: Vec<u32> = report.outcomes.iter().map(|o| o.test_id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<u32>>());
    }
}
