// Client configuration for the remote execution backend.
// Built once by the caller and passed into the orchestrator; there is no
// process-wide singleton.

use anyhow::{Context, Result};
use std::time::Duration;

/// Hard per-request item limit enforced by the backend for batch
/// submission and batch status endpoints.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 20;

const DEFAULT_LANGUAGE_ID: u32 = 71; // python3 on a stock deployment
const DEFAULT_WALL_CLOCK_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(4);
const DEFAULT_SUBMIT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Backend language identifier. Overridable because deployments encode
    /// specific runtime versions differently.
    pub language_id: u32,
    /// Overall deadline for driving one batch of jobs to completion.
    pub wall_clock_timeout: Duration,
    pub initial_poll_interval: Duration,
    pub max_poll_interval: Duration,
    pub max_batch_size: usize,
    /// Transport-level retries applied to submissions before surfacing a
    /// fatal error. Status fetches are retried by the poll loop instead.
    pub submit_retries: u32,
}

/// How requests authenticate against the backend, derived from the
/// configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Managed gateway deployment: vendor key plus vendor host header.
    Gateway { key: String, host: String },
    /// Self-hosted deployment: single token header.
    SelfHosted { token: String },
    /// No credential configured.
    Anonymous,
}

impl JudgeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            language_id: DEFAULT_LANGUAGE_ID,
            wall_clock_timeout: DEFAULT_WALL_CLOCK_TIMEOUT,
            initial_poll_interval: DEFAULT_INITIAL_POLL_INTERVAL,
            max_poll_interval: DEFAULT_MAX_POLL_INTERVAL,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            submit_retries: DEFAULT_SUBMIT_RETRIES,
        }
    }

    /// Build a configuration from the environment.
    ///
    /// `JUDGE_API_URL` is required; `JUDGE_API_KEY` and `JUDGE_LANGUAGE_ID`
    /// are optional overrides.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("JUDGE_API_URL").context("JUDGE_API_URL is not set")?;
        let mut config = Self::new(base_url);
        config.api_key = std::env::var("JUDGE_API_KEY").ok();
        if let Ok(raw) = std::env::var("JUDGE_LANGUAGE_ID") {
            config.language_id = raw
                .parse()
                .context("JUDGE_LANGUAGE_ID must be a numeric language id")?;
        }
        Ok(config)
    }

    pub fn with_language(mut self, language_id: u32) -> Self {
        self.language_id = language_id;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_wall_clock_timeout(mut self, timeout: Duration) -> Self {
        self.wall_clock_timeout = timeout;
        self
    }

    /// Select the authentication mode by inspecting the base URL. Gateway
    /// hosts are recognized by their vendor domain; anything else is
    /// treated as self-hosted.
    pub fn auth_mode(&self) -> AuthMode {
        match &self.api_key {
            None => AuthMode::Anonymous,
            Some(key) => {
                if self.base_url.contains("rapidapi.com") {
                    AuthMode::Gateway {
                        key: key.clone(),
                        host: host_of(&self.base_url),
                    }
                } else {
                    AuthMode::SelfHosted { token: key.clone() }
                }
            }
        }
    }
}

fn host_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_limits() {
        let config = JudgeConfig::new("http://judge.internal:2358");
        assert_eq!(config.max_batch_size, 20);
        assert_eq!(config.submit_retries, 3);
        assert!(config.initial_poll_interval <= config.max_poll_interval);
    }

    #[test]
    fn gateway_mode_for_vendor_urls() {
        let config = JudgeConfig::new("https://judge0-ce.p.rapidapi.com").with_api_key("secret");
        assert_eq!(
            config.auth_mode(),
            AuthMode::Gateway {
                key: "secret".to_string(),
                host: "judge0-ce.p.rapidapi.com".to_string(),
            }
        );
    }

    #[test]
    fn self_hosted_mode_for_other_urls() {
        let config = JudgeConfig::new("http://judge.internal:2358").with_api_key("token");
        assert_eq!(
            config.auth_mode(),
            AuthMode::SelfHosted {
                token: "token".to_string(),
            }
        );
    }

    #[test]
    fn anonymous_without_credential() {
        let config = JudgeConfig::new("http://judge.internal:2358");
        assert_eq!(config.auth_mode(), AuthMode::Anonymous);
    }

    #[test]
    fn host_extraction_ignores_path_and_scheme() {
        assert_eq!(
            host_of("https://judge0-ce.p.rapidapi.com/submissions"),
            "judge0-ce.p.rapidapi.com"
        );
        assert_eq!(host_of("judge.internal:2358"), "judge.internal:2358");
    }
}
