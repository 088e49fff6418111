use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use crate::models::overview::PROBE_FAILURE_MS;
use crate::models::{
    Conversion, MarketMetrics, MarketMetricsReport, Movers, NetworkHealth, SortKey, TokenSummary,
};
use crate::sources::{SourceError, TokenSource};
use super::pricing::PriceOracle;

/// Fetches everything the overview tab shows.
pub struct OverviewService {
    source: Arc<dyn TokenSource>,
    oracle: PriceOracle,
    image_gateway: String,
    movers_limit: usize,
}

impl OverviewService {
    pub fn new(source: Arc<dyn TokenSource>, oracle: PriceOracle, image_gateway: String, movers_limit: usize) -> Self {
        Self { source, oracle, image_gateway, movers_limit }
    }

    /// Stats and price must both succeed; otherwise the fixed fallback
    /// payload is returned with `success == false`.
    pub async fn market_metrics(&self) -> MarketMetricsReport {
        let (stats, price) = tokio::join!(self.source.stats(), self.source.native_price());
        match (stats, price) {
            (Ok(stats), Ok(price)) => MarketMetricsReport::live(MarketMetrics::from_stats(&stats, price)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Market metrics unavailable: {}", e);
                MarketMetricsReport::fallback(format!("Failed to fetch market metrics: {}", e))
            }
        }
    }

    /// Highest priced, lowest priced and newest tokens from page 1.
    pub async fn movers(&self) -> Result<Movers, SourceError> {
        let (gainers, losers, listings, price) = tokio::join!(
            self.source.search(SortKey::PriceHighToLow, 1),
            self.source.search(SortKey::PriceLowToHigh, 1),
            self.source.search(SortKey::NewlyCreated, 1),
            self.oracle.usd_per_native(),
        );

        let conversion = Conversion {
            usd_per_native: price,
            image_gateway: &self.image_gateway,
            observed_at: Utc::now(),
        };
        let top = |page: crate::sources::SearchPage| -> Vec<TokenSummary> {
            page.tokens
                .iter()
                .take(self.movers_limit)
                .map(|raw| {
                    let mut token = TokenSummary::from_upstream(raw, &conversion);
                    token.price_change = Some(raw.price_change_1h());
                    token
                })
                .collect()
        };

        Ok(Movers {
            top_gainers: top(gainers?),
            top_losers: top(losers?),
            new_listings: top(listings?),
        })
    }

    /// Two timed requests against the price endpoint. A probe that fails, or
    /// answers with something other than JSON, counts as 999 ms.
    pub async fn network_health(&self) -> NetworkHealth {
        let started = Instant::now();
        let first = self.source.probe().await;
        let latency = started.elapsed();

        let (latency_ms, download_kbps) = match first {
            Ok(probe) if probe.is_json => {
                let secs = latency.as_secs_f64().max(0.001);
                let bytes = probe.bytes.unwrap_or(1024) as f64;
                let kbps = (bytes * 8.0 / secs / 1024.0).round().min(10_000.0) as u64;
                (latency.as_millis() as u64, kbps)
            }
            Ok(_) => (PROBE_FAILURE_MS, 0),
            Err(e) => {
                tracing::debug!("latency probe failed: {}", e);
                (PROBE_FAILURE_MS, 0)
            }
        };

        let started = Instant::now();
        let api_response_ms = match self.source.probe().await {
            Ok(_) => started.elapsed().as_millis() as u64,
            Err(_) => PROBE_FAILURE_MS,
        };

        NetworkHealth::from_samples(latency_ms, api_response_ms, download_kbps, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overview::HealthStatus;
    use crate::models::PlatformStats;
    use crate::sources::mock::{token, ScriptedSource};

    fn service(source: Arc<ScriptedSource>) -> OverviewService {
        let oracle = PriceOracle::new(source.clone(), 0.5);
        OverviewService::new(source, oracle, "https://ipfs.example".into(), 2)
    }

    #[tokio::test]
    async fn metrics_fall_back_when_stats_fail() {
        let source = Arc::new(ScriptedSource::new());
        source.set_stats(None);

        let report = service(source).market_metrics().await;

        assert!(!report.success);
        assert_eq!(report.data, MarketMetrics::fallback());
    }

    #[tokio::test]
    async fn metrics_use_live_price() {
        let source = Arc::new(ScriptedSource::new());
        source.set_price(Some(2.0));
        let stats: PlatformStats = serde_json::from_str(r#"{"tvl": {"total": 21}}"#).unwrap();
        source.set_stats(Some(stats));

        let report = service(source).market_metrics().await;

        assert!(report.success);
        assert_eq!(report.data.tvl, 42.0);
    }

    #[tokio::test]
    async fn movers_take_the_top_of_each_listing() {
        let source = Arc::new(ScriptedSource::new());
        source.set_page(
            SortKey::PriceHighToLow,
            1,
            vec![token("a", 0, 0.0), token("b", 0, 0.0), token("c", 0, 0.0)],
            true,
        );
        source.set_page(SortKey::NewlyCreated, 1, vec![token("n", 0, 0.0)], true);

        let movers = service(source).movers().await.unwrap();

        assert_eq!(movers.top_gainers.len(), 2);
        assert_eq!(movers.top_gainers[0].id, "a");
        assert!(movers.top_losers.is_empty());
        assert_eq!(movers.new_listings[0].price_change, Some(0.0));
    }

    #[tokio::test]
    async fn failed_probes_report_999() {
        let source = Arc::new(ScriptedSource::new());
        source.set_price(None);

        let health = service(source).network_health().await;

        assert_eq!(health.latency_ms, PROBE_FAILURE_MS);
        assert_eq!(health.api_response_ms, PROBE_FAILURE_MS);
        assert_eq!(health.status, HealthStatus::Poor);
    }
}
