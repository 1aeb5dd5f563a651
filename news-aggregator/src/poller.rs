use crate::config::SourceConfig;
use crate::fetcher::RetryingFetcher;
use crate::traits::Transport;
use crate::types::{Extractor, FetchConfig, PollerState, Record, StopStatus};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How long `stop` waits for the polling task to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause after a cycle fails unexpectedly, before the next attempt.
pub const FAILURE_PAUSE: Duration = Duration::from_secs(5);

/// Consumer end of one poller's record channel.
pub struct PollerOutput {
    source: String,
    receiver: mpsc::UnboundedReceiver<Record>,
    closed: bool,
}

impl PollerOutput {
    pub fn new(source: impl Into<String>, receiver: mpsc::UnboundedReceiver<Record>) -> Self {
        Self {
            source: source.into(),
            receiver,
            closed: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next record already in the channel, without waiting.
    pub fn try_next(&mut self) -> Option<Record> {
        if self.closed {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(record) => Some(record),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CycleError {
    #[error("extraction task failed: {0}")]
    Extraction(#[from] tokio::task::JoinError),

    #[error("cycle panicked: {0}")]
    Panicked(String),

    #[error("output channel closed")]
    OutputClosed,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// State owned by one running polling task.
struct PollLoop {
    url: String,
    interval: Duration,
    fetcher: RetryingFetcher,
    extractor: Arc<dyn Extractor>,
    output: mpsc::UnboundedSender<Record>,
    stop: CancellationToken,
}

impl PollLoop {
    async fn run(self) {
        info!(url = %self.url, extractor = self.extractor.name(), "poller started");

        while !self.stop.is_cancelled() {
            // A panicking transport must not end the task.
            let outcome = AssertUnwindSafe(self.cycle())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(CycleError::Panicked(panic_message(&*payload))));

            match outcome {
                Ok(pushed) => debug!(url = %self.url, records = pushed, "poll cycle complete"),
                Err(CycleError::OutputClosed) => {
                    warn!(url = %self.url, "output channel closed, poller exiting");
                    break;
                }
                Err(e) => {
                    error!(url = %self.url, error = %e, "poll cycle failed");
                    if self.wait(FAILURE_PAUSE).await {
                        break;
                    }
                    continue;
                }
            }

            if self.wait(self.interval).await {
                break;
            }
        }

        info!(url = %self.url, "poller stopped");
    }

    /// Sleeps for `duration`. Returns true if the stop signal ended the wait.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.stop.cancelled() => true,
        }
    }

    async fn cycle(&self) -> Result<usize, CycleError> {
        let Some(content) = self.fetcher.fetch(&self.url).await else {
            return Ok(0);
        };

        let extractor = self.extractor.clone();
        let records = tokio::task::spawn_blocking(move || extractor.extract(&content)).await?;
        let total = records.len();

        let mut pushed = 0;
        for record in records {
            if self.stop.is_cancelled() {
                debug!(url = %self.url, dropped = total - pushed, "stop requested mid-batch");
                break;
            }
            self.output.send(record).map_err(|_| CycleError::OutputClosed)?;
            pushed += 1;
        }

        Ok(pushed)
    }
}

/// Polls one source on its own schedule and pushes extracted records into a
/// private channel.
pub struct SourcePoller {
    config: SourceConfig,
    extractor: Arc<dyn Extractor>,
    transport: Arc<dyn Transport>,
    fetch_config: FetchConfig,
    output: mpsc::UnboundedSender<Record>,
    stop: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SourcePoller {
    pub fn new(
        config: SourceConfig,
        extractor: Arc<dyn Extractor>,
        transport: Arc<dyn Transport>,
        fetch_config: FetchConfig,
    ) -> (Self, PollerOutput) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let output = PollerOutput::new(config.url(), receiver);

        let poller = Self {
            config,
            extractor,
            transport,
            fetch_config,
            output: sender,
            stop: CancellationToken::new(),
            handle: None,
        };

        (poller, output)
    }

    pub fn url(&self) -> &str {
        self.config.url()
    }

    pub fn state(&self) -> PollerState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => PollerState::Running,
            _ => PollerState::Stopped,
        }
    }

    /// Spawns the polling task. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if self.state() == PollerState::Running {
            warn!(url = self.url(), "poller already running");
            return;
        }

        self.stop = CancellationToken::new();
        let fetcher = RetryingFetcher::new(self.transport.clone(), &self.fetch_config)
            .with_cancellation(self.stop.clone());

        let worker = PollLoop {
            url: self.config.url().to_string(),
            interval: self.config.poll_interval(),
            fetcher,
            extractor: self.extractor.clone(),
            output: self.output.clone(),
            stop: self.stop.clone(),
        };

        self.handle = Some(tokio::spawn(worker.run()));
    }

    /// Signals the task to stop and waits up to [`STOP_TIMEOUT`] for it.
    ///
    /// An in-flight network read is not interrupted, so a poller blocked on a
    /// slow endpoint can outlive the deadline and report `TimedOut`.
    pub async fn stop(&mut self) -> StopStatus {
        self.stop.cancel();

        let Some(handle) = self.handle.as_mut() else {
            return StopStatus::Stopped;
        };

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => {
                if let Err(e) = joined {
                    error!(url = self.config.url(), error = %e, "poller task ended abnormally");
                }
                self.handle = None;
                StopStatus::Stopped
            }
            Err(_) => {
                warn!(
                    url = self.config.url(),
                    timeout = ?STOP_TIMEOUT,
                    "poller did not stop in time"
                );
                StopStatus::TimedOut
            }
        }
    }

    /// Abandons the task outright. Used after `stop` timed out.
    pub fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            warn!(url = self.config.url(), "poller aborted");
        }
    }
}
