use crate::poller::PollerOutput;
use crate::types::{AggregatorStats, Record, RecordSink};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Interval between drains of the poller channels.
pub const TICK: Duration = Duration::from_secs(1);

/// Single consumer of every poller channel.
///
/// Owns the set of records already forwarded. The first arrival of a record
/// goes to the sink and every later copy, from any poller, is dropped.
pub struct Aggregator {
    outputs: Vec<PollerOutput>,
    seen: HashSet<Record>,
    sink: Box<dyn RecordSink>,
    forwarded: u64,
    duplicates: u64,
}

impl Aggregator {
    pub fn new(outputs: Vec<PollerOutput>, sink: Box<dyn RecordSink>) -> Self {
        Self {
            outputs,
            seen: HashSet::new(),
            sink,
            forwarded: 0,
            duplicates: 0,
        }
    }

    /// Drains whatever each channel holds right now, one poller after the
    /// other, and returns how many new records reached the sink.
    pub fn drain_once(&mut self) -> usize {
        let mut forwarded = 0;

        for output in &mut self.outputs {
            while let Some(record) = output.try_next() {
                if self.seen.contains(&record) {
                    self.duplicates += 1;
                    debug!(source = output.source(), title = record.title(), "duplicate dropped");
                    continue;
                }
                self.sink.emit(&record);
                self.seen.insert(record);
                forwarded += 1;
            }
        }

        self.forwarded += forwarded as u64;
        forwarded
    }

    /// True once every channel is closed and empty.
    pub fn is_exhausted(&self) -> bool {
        self.outputs.iter().all(PollerOutput::is_closed)
    }

    pub fn stats(&self) -> AggregatorStats {
        AggregatorStats {
            forwarded: self.forwarded,
            duplicates: self.duplicates,
            seen: self.seen.len(),
        }
    }

    /// Drains on every tick until `shutdown` fires or all pollers are gone.
    ///
    /// Records still queued when `shutdown` fires are not drained.
    pub async fn run(mut self, shutdown: CancellationToken) -> AggregatorStats {
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(pollers = self.outputs.len(), "aggregator started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let forwarded = self.drain_once();
                    if forwarded > 0 {
                        debug!(forwarded, "tick");
                    }
                    if self.is_exhausted() {
                        info!("all poller channels closed");
                        break;
                    }
                }
            }
        }

        let stats = self.stats();
        info!(
            forwarded = stats.forwarded,
            duplicates = stats.duplicates,
            "aggregator stopped"
        );
        stats
    }
}
