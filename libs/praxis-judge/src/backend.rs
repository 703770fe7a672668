/// Remote Execution Backend - Protocol Boundary
///
/// **Core Responsibility:**
/// Speak the backend's HTTP/REST protocol: create submissions (single
/// wait-mode or batch), and fetch submission status by token.
///
/// **Critical Architectural Boundary:**
/// - Backend knows HOW to reach the remote service (URLs, auth, retries)
/// - Backend does NOT chunk work (dispatcher's job)
/// - Backend does NOT classify results (reconciler's job)
///
/// The `ExecutionBackend` trait is the seam that lets the dispatcher and
/// poller run against an in-memory fake in tests.
use crate::codec;
use crate::config::{AuthMode, JudgeConfig};
use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const STATUS_IN_QUEUE: u32 = 1;
pub const STATUS_PROCESSING: u32 = 2;
pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_WRONG_ANSWER: u32 = 4;
pub const STATUS_TIME_LIMIT: u32 = 5;
pub const STATUS_COMPILE_ERROR: u32 = 6;

const RETRY_DELAY_STEP: Duration = Duration::from_millis(500);

/// One job to submit. Payload fields are already wire-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRequest {
    pub source_code: String,
    pub language_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

#[derive(Serialize)]
struct BatchCreateRequest<'a> {
    submissions: &'a [SubmissionRequest],
}

#[derive(Debug, Deserialize)]
struct CreatedSubmission {
    token: String,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

impl StatusInfo {
    /// Queued and processing are the only non-terminal states.
    pub fn is_terminal(&self) -> bool {
        self.id != STATUS_IN_QUEUE && self.id != STATUS_PROCESSING
    }
}

/// Raw submission state as reported by the backend. Payload fields stay
/// wire-encoded until the reconciler decodes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: StatusInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
}

impl Submission {
    /// Stand-in result for a token that never reached a terminal status
    /// before the polling deadline.
    pub fn synthetic_timeout(token: String) -> Self {
        Submission {
            token: Some(token),
            status: StatusInfo {
                id: STATUS_TIME_LIMIT,
                description: "Time Limit Exceeded".to_string(),
            },
            stdout: None,
            stderr: None,
            compile_output: None,
            message: Some(codec::encode(
                "execution did not finish before the polling deadline",
            )),
            time: None,
            memory: None,
        }
    }
}

#[async_trait::async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submit one job and wait for the backend to finish it.
    async fn run_and_wait(&self, request: &SubmissionRequest) -> Result<Submission>;

    /// Submit a chunk of jobs. Returns one token per job, in request order.
    /// The chunk must respect the backend's per-request item limit.
    async fn create_batch(&self, requests: &[SubmissionRequest]) -> Result<Vec<String>>;

    /// Fetch current status for a chunk of tokens.
    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<Submission>>;
}

/// Production backend over HTTP.
pub struct HttpBackend {
    http: reqwest::Client,
    config: JudgeConfig,
}

impl HttpBackend {
    pub fn new(config: JudgeConfig) -> Result<Self> {
        // Per-request cap; wait-mode submissions block until the job ends
        let http = reqwest::Client::builder()
            .timeout(config.wall_clock_timeout + Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.auth_mode() {
            AuthMode::Gateway { key, host } => request
                .header("X-RapidAPI-Key", key)
                .header("X-RapidAPI-Host", host),
            AuthMode::SelfHosted { token } => request.header("X-Auth-Token", token),
            AuthMode::Anonymous => request,
        }
    }

    /// Send a submission request with bounded transport retries.
    ///
    /// Network failures and 5xx responses are retried with an incremental
    /// delay. A 4xx response is a payload rejection and fails immediately.
    async fn submit_with_retries<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<T> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .context("malformed response from backend");
                    }
                    if status.is_client_error() {
                        let body = response.text().await.unwrap_or_default();
                        bail!("submission rejected by backend ({}): {}", status, body);
                    }
                    anyhow!("backend returned {}", status)
                }
                Err(e) => anyhow!(e).context("submission request failed"),
            };

            if attempt > self.config.submit_retries {
                return Err(error.context(format!("giving up after {} attempts", attempt)));
            }
            warn!(attempt, error = %error, "transient submission failure, retrying");
            tokio::time::sleep(RETRY_DELAY_STEP * attempt).await;
        }
    }
}

#[async_trait::async_trait]
impl ExecutionBackend for HttpBackend {
    async fn run_and_wait(&self, request: &SubmissionRequest) -> Result<Submission> {
        let url = format!("{}/submissions?base64_encoded=true&wait=true", self.base());
        debug!(language_id = request.language_id, "submitting wait-mode job");
        self.submit_with_retries(|| self.apply_auth(self.http.post(&url).json(request)))
            .await
    }

    async fn create_batch(&self, requests: &[SubmissionRequest]) -> Result<Vec<String>> {
        let url = format!("{}/submissions/batch?base64_encoded=true", self.base());
        let body = BatchCreateRequest {
            submissions: requests,
        };
        debug!(jobs = requests.len(), "submitting batch");
        let created: Vec<CreatedSubmission> = self
            .submit_with_retries(|| self.apply_auth(self.http.post(&url).json(&body)))
            .await?;
        if created.len() != requests.len() {
            bail!(
                "backend returned {} tokens for {} submissions",
                created.len(),
                requests.len()
            );
        }
        Ok(created.into_iter().map(|c| c.token).collect())
    }

    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<Submission>> {
        let url = format!(
            "{}/submissions/batch?tokens={}&base64_encoded=true&fields=token,status,stdout,stderr,compile_output,message,time,memory",
            self.base(),
            tokens.join(",")
        );
        let response = self
            .apply_auth(self.http.get(&url))
            .send()
            .await
            .context("status fetch failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("status fetch returned {}", status);
        }
        let body: BatchGetResponse = response
            .json()
            .await
            .context("malformed status response from backend")?;
        Ok(body.submissions)
    }
}
