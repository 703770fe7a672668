/// Poller - Drive Asynchronous Submissions to Completion
///
/// **Core Responsibility:**
/// Given the tokens from a batch dispatch, repeatedly fetch status in
/// chunked rounds until every job is terminal or the wall-clock deadline
/// elapses.
///
/// **Critical Properties:**
/// - Returns exactly one raw result per token, in token order, always
/// - Never errors: unresolved tokens degrade to synthesized timeouts
/// - Sleep intervals between rounds are non-decreasing and capped
/// - A round is a barrier: every chunk request settles before backoff
///
/// Each token's lifecycle is tracked in an index-addressed state table
/// (`Queued → Processing → Terminal`), so input-order reconstruction is a
/// table walk rather than a property of map iteration.
use crate::backend::{ExecutionBackend, Submission, STATUS_PROCESSING};
use crate::config::JudgeConfig;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

const BACKOFF_FACTOR: f64 = 1.5;

#[derive(Debug)]
enum JobState {
    Queued,
    Processing,
    Terminal(Submission),
}

impl JobState {
    fn is_terminal(&self) -> bool {
        matches!(self, JobState::Terminal(_))
    }
}

/// Next inter-round sleep interval. Grows by a fixed factor up to `max`
/// and never decreases within one poll call.
fn next_interval(current: Duration, max: Duration) -> Duration {
    let scaled = current.mul_f64(BACKOFF_FACTOR);
    if scaled > max {
        max
    } else {
        scaled
    }
}

/// Poll the backend until every token is terminal or the configured
/// wall-clock timeout elapses. Infallible by contract: per-round transport
/// failures are logged and retried on the next round, and tokens that
/// never resolve come back as synthesized timeouts.
pub async fn poll<B: ExecutionBackend>(
    backend: &B,
    config: &JudgeConfig,
    tokens: &[String],
) -> Vec<Submission> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut states: Vec<JobState> = tokens.iter().map(|_| JobState::Queued).collect();
    let index_of: HashMap<&str, usize> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| (token.as_str(), i))
        .collect();

    let deadline = Instant::now() + config.wall_clock_timeout;
    let mut interval = config.initial_poll_interval;
    let mut round = 0u32;

    loop {
        let pending: Vec<String> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| !states[*i].is_terminal())
            .map(|(_, token)| token.clone())
            .collect();
        if pending.is_empty() {
            break;
        }
        if Instant::now() >= deadline {
            break;
        }

        round += 1;
        let chunks: Vec<&[String]> = pending.chunks(config.max_batch_size).collect();
        debug!(
            round,
            pending = pending.len(),
            chunks = chunks.len(),
            "polling round"
        );

        // Round barrier: every chunk request settles before we move on
        let responses = join_all(chunks.iter().map(|chunk| backend.fetch_batch(chunk))).await;
        for response in responses {
            let submissions = match response {
                Ok(submissions) => submissions,
                Err(e) => {
                    warn!(round, error = %e, "status fetch failed, retrying next round");
                    continue;
                }
            };
            for submission in submissions {
                let Some(token) = submission.token.as_deref() else {
                    warn!(round, "status response without token, ignoring");
                    continue;
                };
                let Some(&idx) = index_of.get(token) else {
                    warn!(round, token, "status response for unknown token, ignoring");
                    continue;
                };
                if states[idx].is_terminal() {
                    continue;
                }
                if submission.status.is_terminal() {
                    states[idx] = JobState::Terminal(submission);
                } else if submission.status.id == STATUS_PROCESSING {
                    states[idx] = JobState::Processing;
                }
            }
        }

        if states.iter().all(|state| state.is_terminal()) {
            break;
        }
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep((deadline - now).min(interval)).await;
        interval = next_interval(interval, config.max_poll_interval);
    }

    // Walk the table in index order; this is what guarantees output order
    // equals input order no matter which chunk finished first
    let mut results = Vec::with_capacity(tokens.len());
    for (idx, state) in states.into_iter().enumerate() {
        match state {
            JobState::Terminal(submission) => results.push(submission),
            JobState::Queued | JobState::Processing => {
                warn!(token = %tokens[idx], "unresolved at deadline, synthesizing timeout");
                results.push(Submission::synthetic_timeout(tokens[idx].clone()));
            }
        }
    }
    results
}
