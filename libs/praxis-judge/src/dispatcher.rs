/// Submission Dispatcher - Fan-Out Strategy Selection
///
/// **Core Responsibility:**
/// Turn (source, N test cases) into either N synchronous wait-mode calls
/// or a set of chunked batch submissions, respecting the backend's hard
/// per-request item limit.
///
/// **Critical Properties:**
/// - `tokens[i]` / `results[i]` always correspond to `tests[i]`
/// - An empty test list returns immediately with no network call
/// - A failed chunk submission is fatal for the whole dispatch; the
///   caller decides whether to retry the operation as a whole
use crate::backend::{ExecutionBackend, Submission, SubmissionRequest};
use crate::codec;
use crate::config::JudgeConfig;
use crate::types::TestCase;
use anyhow::{bail, Context, Result};
use futures_util::future::try_join_all;
use tracing::debug;

/// Strategy chosen by the caller based on expected latency and volume,
/// not inferred from input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// One wait-mode request per test, fanned out concurrently. Minimal
    /// latency for small, known-small test counts.
    Sync,
    /// Chunked batch submission returning tokens for the poller.
    Batch,
}

/// What a dispatch produced: finished raw results (sync mode) or tokens
/// still in flight (batch mode).
#[derive(Debug)]
pub enum Dispatch {
    Completed(Vec<Submission>),
    Submitted(Vec<String>),
}

fn build_requests(config: &JudgeConfig, source: &str, tests: &[TestCase]) -> Vec<SubmissionRequest> {
    let source_code = codec::encode(source);
    tests
        .iter()
        .map(|test| SubmissionRequest {
            source_code: source_code.clone(),
            language_id: config.language_id,
            stdin: if test.input.is_empty() {
                None
            } else {
                Some(codec::encode(&test.input))
            },
        })
        .collect()
}

pub async fn dispatch<B: ExecutionBackend>(
    backend: &B,
    config: &JudgeConfig,
    source: &str,
    tests: &[TestCase],
    mode: DispatchMode,
) -> Result<Dispatch> {
    if tests.is_empty() {
        return Ok(match mode {
            DispatchMode::Sync => Dispatch::Completed(Vec::new()),
            DispatchMode::Batch => Dispatch::Submitted(Vec::new()),
        });
    }

    let requests = build_requests(config, source, tests);

    match mode {
        DispatchMode::Sync => {
            debug!(tests = tests.len(), "dispatching synchronous fan-out");
            let results = try_join_all(requests.iter().map(|r| backend.run_and_wait(r)))
                .await
                .context("synchronous submission failed")?;
            Ok(Dispatch::Completed(results))
        }
        DispatchMode::Batch => {
            let chunks: Vec<&[SubmissionRequest]> =
                requests.chunks(config.max_batch_size).collect();
            debug!(
                tests = tests.len(),
                chunks = chunks.len(),
                "dispatching batch submission"
            );
            let token_lists = try_join_all(chunks.iter().map(|chunk| backend.create_batch(chunk)))
                .await
                .context("batch submission failed")?;
            // Flattening in chunk order keeps tokens[i] aligned with tests[i]
            let tokens: Vec<String> = token_lists.into_iter().flatten().collect();
            if tokens.len() != tests.len() {
                bail!(
                    "backend returned {} tokens for {} tests",
                    tokens.len(),
                    tests.len()
                );
            }
            Ok(Dispatch::Submitted(tokens))
        }
    }
}
