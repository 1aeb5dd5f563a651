use crate::sources::ExtractorKind;
use crate::types::{AggregatorError, Result};
use std::time::Duration;
use url::Url;

/// Built-in sources and their poll intervals in seconds.
pub const DEFAULT_SOURCES: [(&str, u64); 3] = [
    ("https://www.liputan6.com/", 3600),
    ("https://www.bisnis.com/", 1800),
    ("https://www.abc.net.au/news/indonesian", 900),
];

/// One polled endpoint, validated and bound to its extractor kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    url: String,
    poll_interval_seconds: u64,
    extractor_kind: ExtractorKind,
}

impl SourceConfig {
    pub fn new(url: impl Into<String>, poll_interval_seconds: u64) -> Result<Self> {
        let url = url.into();
        Url::parse(&url)?;

        if poll_interval_seconds == 0 {
            return Err(AggregatorError::InvalidInterval { url });
        }

        let extractor_kind = ExtractorKind::from_url(&url)?;

        Ok(Self {
            url,
            poll_interval_seconds,
            extractor_kind,
        })
    }

    /// Parses the `URL=SECONDS` form used on the command line.
    pub fn parse(entry: &str) -> Result<Self> {
        let (url, seconds) = entry.rsplit_once('=').ok_or_else(|| {
            AggregatorError::General(format!("expected URL=SECONDS, got `{}`", entry))
        })?;
        let seconds = seconds.trim().parse::<u64>().map_err(|e| {
            AggregatorError::General(format!("invalid interval in `{}`: {}", entry, e))
        })?;
        Self::new(url.trim(), seconds)
    }

    pub fn defaults() -> Vec<Result<Self>> {
        DEFAULT_SOURCES
            .iter()
            .map(|(url, seconds)| Self::new(*url, *seconds))
            .collect()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn extractor_kind(&self) -> ExtractorKind {
        self.extractor_kind
    }
}
