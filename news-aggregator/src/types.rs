use interfaces::ValidationError;
use serde::Serialize;
use std::time::Duration;

pub use interfaces::{Extractor, Record, RecordSink};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// Base of the backoff schedule: attempt `n` waits `retry_delay_seconds * 2^n`.
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
    pub max_body_mb: usize,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 1,
            max_redirects: 5,
            max_body_mb: 10,
            use_env_proxy: true,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    Running,
    Stopped,
}

/// Outcome of a bounded stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopStatus {
    /// The polling task observed the stop signal and exited.
    Stopped,
    /// The join deadline passed; the task may still be running.
    TimedOut,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    pub forwarded: u64,
    pub duplicates: u64,
    pub seen: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownReport {
    pub pollers: Vec<(String, StopStatus)>,
    pub aggregator: AggregatorStats,
}

impl ShutdownReport {
    pub fn timed_out(&self) -> impl Iterator<Item = &str> {
        self.pollers
            .iter()
            .filter(|(_, status)| *status == StopStatus::TimedOut)
            .map(|(url, _)| url.as_str())
    }
}

/// Failure of a single transport read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Hard(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Poll interval for {url} must be positive")]
    InvalidInterval { url: String },

    #[error("Unsupported source: {url}")]
    UnsupportedSource { url: String },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
