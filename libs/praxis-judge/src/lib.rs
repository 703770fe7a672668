pub mod backend;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod orchestrator;
pub mod poller;
pub mod reconciler;
pub mod types;

// Re-export the surface callers actually use
pub use backend::{ExecutionBackend, HttpBackend, Submission, SubmissionRequest};
pub use config::{AuthMode, JudgeConfig};
pub use dispatcher::{Dispatch, DispatchMode};
pub use orchestrator::Orchestrator;
pub use types::{OutcomeStatus, RunReport, TestCase, TestOutcome};
