use crate::traits::Transport;
use crate::types::{FetchConfig, Result, TransportError};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Production transport backed by one pooled `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
    max_body_mb: usize,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            max_body_mb: config.max_body_mb,
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Hard(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<String, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Hard(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.max_body_mb {
                return Err(TransportError::Hard(format!("body too large: {}MB", size_mb)));
            }
        }

        response.text().await.map_err(classify)
    }
}

/// Network read with a per-attempt timeout and exponential backoff.
///
/// Only timeouts are retried. Any other failure ends the fetch at once. Both
/// outcomes come back as `None`, meaning "no content this cycle".
pub struct RetryingFetcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    cancel: CancellationToken,
}

impl RetryingFetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &FetchConfig) -> Self {
        Self {
            transport,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay_seconds),
            cancel: CancellationToken::new(),
        }
    }

    /// Backoff waits end early, with no content, once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn backoff(&self) -> ExponentialBackoff<backoff::SystemClock> {
        ExponentialBackoff {
            current_interval: self.retry_delay,
            initial_interval: self.retry_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.retry_delay * 2u32.saturating_pow(self.max_retries),
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    pub async fn fetch(&self, url: &str) -> Option<String> {
        let mut backoff = self.backoff();

        for attempt in 0..self.max_retries {
            let result = match tokio::time::timeout(self.timeout, self.transport.get(url)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout),
            };

            match result {
                Ok(content) => {
                    debug!(url, bytes = content.len(), attempt = attempt + 1, "fetched");
                    return Some(content);
                }
                Err(TransportError::Timeout) => {
                    warn!(url, attempt = attempt + 1, "fetch timed out");
                }
                Err(TransportError::Hard(reason)) => {
                    error!(url, %reason, "fetch failed");
                    return None;
                }
            }

            if attempt + 1 < self.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    debug!(url, ?delay, "backing off");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancel.cancelled() => return None,
                    }
                }
            }
        }

        warn!(url, attempts = self.max_retries, "giving up after repeated timeouts");
        None
    }
}
