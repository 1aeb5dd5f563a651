pub mod types;
pub mod traits;
pub mod config;
pub mod fetcher;
pub mod sources;
pub mod poller;
pub mod aggregator;
pub mod sink;
pub mod supervisor;

pub use types::*;
pub use traits::Transport;
pub use config::SourceConfig;
pub use fetcher::{ReqwestTransport, RetryingFetcher};
pub use sources::{ExtractorKind, ExtractorRegistry, HtmlSiteExtractor};
pub use poller::{PollerOutput, SourcePoller};
pub use aggregator::Aggregator;
pub use sink::{JsonLinesSink, MemorySink, TextSink};
pub use supervisor::Supervisor;
