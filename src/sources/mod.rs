pub mod fatfinger;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use crate::models::{PlatformStats, SortKey, UpstreamToken};

/// One page of the upstream search listing.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub tokens: Vec<UpstreamToken>,
    pub has_more: bool,
}

/// Entry of the trending listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingToken {
    pub id: String,
    pub price_change: f64,
}

/// Outcome of a lightweight request used to measure upstream health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub is_json: bool,
    pub bytes: Option<u64>,
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, sort: SortKey, page: u32) -> Result<SearchPage, SourceError>;
    async fn trending(&self) -> Result<Vec<TrendingToken>, SourceError>;
    /// USD price of the chain's native token.
    async fn native_price(&self) -> Result<f64, SourceError>;
    async fn stats(&self) -> Result<PlatformStats, SourceError>;
    async fn probe(&self) -> Result<ProbeResponse, SourceError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Rate limited")]
    RateLimit,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Upstream reported failure: {0}")]
    Unsuccessful(String),
}
