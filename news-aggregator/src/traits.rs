use crate::types::TransportError;
use async_trait::async_trait;

/// A single network read of a source endpoint.
///
/// Implementations report timeouts separately from every other failure so the
/// fetcher can retry the former and give up on the latter.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<String, TransportError>;
}
