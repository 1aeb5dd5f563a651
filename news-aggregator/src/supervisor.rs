use crate::aggregator::Aggregator;
use crate::config::SourceConfig;
use crate::poller::{PollerOutput, SourcePoller};
use crate::sources::ExtractorRegistry;
use crate::traits::Transport;
use crate::types::{
    AggregatorError, AggregatorStats, FetchConfig, PollerState, RecordSink, Result,
    ShutdownReport, StopStatus,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Owns every poller and runs the aggregator until shutdown.
pub struct Supervisor {
    pollers: Vec<SourcePoller>,
    outputs: Vec<PollerOutput>,
}

impl Supervisor {
    /// Builds one poller per config. Fails on the first source whose kind has
    /// no registered extractor.
    pub fn new(
        configs: Vec<SourceConfig>,
        registry: &ExtractorRegistry,
        transport: Arc<dyn Transport>,
        fetch_config: &FetchConfig,
    ) -> Result<Self> {
        let mut supervisor = Self::empty();
        for config in configs {
            supervisor.add_source(config, registry, transport.clone(), fetch_config)?;
        }
        Ok(supervisor)
    }

    /// Like [`Supervisor::new`], but a source that fails construction is
    /// logged and left out while the rest proceed.
    pub fn from_configs(
        configs: impl IntoIterator<Item = Result<SourceConfig>>,
        registry: &ExtractorRegistry,
        transport: Arc<dyn Transport>,
        fetch_config: &FetchConfig,
    ) -> Self {
        let mut supervisor = Self::empty();
        for config in configs {
            let added = config.and_then(|config| {
                supervisor.add_source(config, registry, transport.clone(), fetch_config)
            });
            if let Err(e) = added {
                error!(error = %e, "skipping source");
            }
        }
        supervisor
    }

    fn empty() -> Self {
        Self {
            pollers: Vec::new(),
            outputs: Vec::new(),
        }
    }

    fn add_source(
        &mut self,
        config: SourceConfig,
        registry: &ExtractorRegistry,
        transport: Arc<dyn Transport>,
        fetch_config: &FetchConfig,
    ) -> Result<()> {
        let extractor =
            registry
                .get(config.extractor_kind())
                .ok_or_else(|| AggregatorError::UnsupportedSource {
                    url: config.url().to_string(),
                })?;

        let (poller, output) = SourcePoller::new(config, extractor, transport, fetch_config.clone());
        self.pollers.push(poller);
        self.outputs.push(output);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pollers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pollers.is_empty()
    }

    pub fn poller_states(&self) -> Vec<(&str, PollerState)> {
        self.pollers.iter().map(|p| (p.url(), p.state())).collect()
    }

    pub fn start_all(&mut self) {
        for poller in &mut self.pollers {
            poller.start();
        }
        info!(pollers = self.pollers.len(), "pollers started");
    }

    /// Stops every poller concurrently, each bounded by its own join timeout.
    /// Pollers that miss the deadline are aborted.
    pub async fn stop_all(&mut self) -> Vec<(String, StopStatus)> {
        let stops = self.pollers.iter_mut().map(|poller| async move {
            let status = poller.stop().await;
            if status == StopStatus::TimedOut {
                poller.abort();
            }
            (poller.url().to_string(), status)
        });

        let statuses = join_all(stops).await;
        info!(pollers = statuses.len(), "pollers stopped");
        statuses
    }

    /// Runs the pipeline until `shutdown` fires, then stops every poller and
    /// the aggregator.
    pub async fn run(
        mut self,
        sink: Box<dyn RecordSink>,
        shutdown: CancellationToken,
    ) -> ShutdownReport {
        self.start_all();

        let aggregator = Aggregator::new(std::mem::take(&mut self.outputs), sink);
        let aggregator_stop = CancellationToken::new();
        let aggregator_task = tokio::spawn(aggregator.run(aggregator_stop.clone()));

        shutdown.cancelled().await;
        info!("shutdown requested");

        let pollers = self.stop_all().await;
        aggregator_stop.cancel();

        let aggregator = match aggregator_task.await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "aggregator task failed");
                AggregatorStats::default()
            }
        };

        let report = ShutdownReport { pollers, aggregator };
        for url in report.timed_out() {
            warn!(url, "poller abandoned after stop timeout");
        }
        report
    }
}
