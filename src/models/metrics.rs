use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Aggregate counters from the launchpad `/stats` endpoint, in native units.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    #[serde(default)]
    pub trade_volumes: Segmented,
    #[serde(default)]
    pub trade_counts: Segmented,
    #[serde(default)]
    pub avg_trade_size: SegmentTotals,
    #[serde(default, deserialize_with = "lenient::number")]
    pub users_count: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dex_tokens_count: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub launchpad_tokens_count: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub bonded_percentage: f64,
    #[serde(default)]
    pub tvl: Tvl,
    #[serde(default)]
    pub approx_revenues: Revenues,
}

/// Combined / dex / bonding-curve breakdown of a windowed counter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Segmented {
    #[serde(default)]
    pub combined: Window,
    #[serde(default)]
    pub dex: Window,
    #[serde(default)]
    pub curve: Window,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Window {
    #[serde(default, deserialize_with = "lenient::number")]
    pub all: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentTotals {
    #[serde(default, deserialize_with = "lenient::number")]
    pub combined: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dex: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub curve: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tvl {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Revenues {
    #[serde(default, deserialize_with = "lenient::number")]
    pub dex: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub curve: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: f64,
}

/// The seventeen overview cards, USD where the source value is native.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub total_volume: f64,
    pub dex_volume: f64,
    pub curve_volume: f64,

    pub total_trade: f64,
    pub dex_trade: f64,
    pub curve_trade: f64,

    pub avg_trade_size: f64,
    pub avg_dex_trade: f64,
    pub avg_curve_trade: f64,

    pub total_users: f64,
    pub dex_tokens: f64,
    pub total_launch: f64,
    pub bonding_percentage: f64,

    pub tvl: f64,
    pub total_revenue: f64,
    pub dex_revenue: f64,
    pub curve_revenue: f64,

    pub usd_per_native: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl MarketMetrics {
    /// Volumes, trade sizes, TVL and revenues are multiplied by the price;
    /// counts are passed through.
    pub fn from_stats(stats: &PlatformStats, usd_per_native: f64) -> Self {
        let usd = |native: f64| round2(native * usd_per_native);
        Self {
            total_volume: usd(stats.trade_volumes.combined.all),
            dex_volume: usd(stats.trade_volumes.dex.all),
            curve_volume: usd(stats.trade_volumes.curve.all),
            total_trade: stats.trade_counts.combined.all,
            dex_trade: stats.trade_counts.dex.all,
            curve_trade: stats.trade_counts.curve.all,
            avg_trade_size: usd(stats.avg_trade_size.combined),
            avg_dex_trade: usd(stats.avg_trade_size.dex),
            avg_curve_trade: usd(stats.avg_trade_size.curve),
            total_users: stats.users_count,
            dex_tokens: stats.dex_tokens_count,
            total_launch: stats.launchpad_tokens_count,
            bonding_percentage: round2(stats.bonded_percentage),
            tvl: usd(stats.tvl.total),
            total_revenue: usd(stats.approx_revenues.total),
            dex_revenue: usd(stats.approx_revenues.dex),
            curve_revenue: usd(stats.approx_revenues.curve),
            usd_per_native,
        }
    }

    /// Static payload served when the stats or price endpoint is down.
    pub fn fallback() -> Self {
        Self {
            total_volume: 1200.5,
            dex_volume: 800.3,
            curve_volume: 400.2,
            total_trade: 5500.0,
            dex_trade: 2000.0,
            curve_trade: 3500.0,
            avg_trade_size: 180.5,
            avg_dex_trade: 250.2,
            avg_curve_trade: 150.8,
            total_users: 2500.0,
            dex_tokens: 10.0,
            total_launch: 120.0,
            bonding_percentage: 4.1,
            tvl: 150.8,
            total_revenue: 18.5,
            dex_revenue: 3.2,
            curve_revenue: 9.8,
            usd_per_native: 0.385,
        }
    }

    /// 0-100 score weighing activity against fixed baselines.
    pub fn sentiment(&self) -> u8 {
        const VOLUME: f64 = 100_000.0;
        const TRADES: f64 = 1_000.0;
        const USERS: f64 = 500.0;
        const TVL: f64 = 10_000.0;
        const REVENUE: f64 = 1_000.0;
        const AVG_TRADE: f64 = 50.0;

        let volume = (self.total_volume / VOLUME * 30.0).min(100.0);
        let trades = (self.total_trade / TRADES * 25.0).min(100.0);
        let users = (self.total_users / USERS * 20.0).min(100.0);
        let tvl = (self.tvl / TVL * 15.0).min(100.0);
        let revenue = (self.total_revenue / REVENUE * 10.0).min(100.0);

        let weighted = volume * 0.25 + trades * 0.20 + users * 0.20 + tvl * 0.20 + revenue * 0.15;

        let diversity = ((self.dex_tokens + self.total_launch) / 10.0).min(10.0);
        let bonding = self.bonding_percentage.min(5.0);
        let avg_trade = (self.avg_trade_size / AVG_TRADE * 5.0).min(5.0);

        let score = (weighted + diversity + bonding + avg_trade).clamp(0.0, 100.0);
        if score.is_finite() { score.round() as u8 } else { 50 }
    }
}

/// Market-metrics payload served to the front end, live or fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetricsReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: MarketMetrics,
    pub sentiment: u8,
    pub timestamp: DateTime<Utc>,
    pub source: &'static str,
}

impl MarketMetricsReport {
    pub fn live(data: MarketMetrics) -> Self {
        Self {
            success: true,
            error: None,
            sentiment: data.sentiment(),
            data,
            timestamp: Utc::now(),
            source: "launchpad",
        }
    }

    pub fn fallback(error: impl Into<String>) -> Self {
        let data = MarketMetrics::fallback();
        Self {
            success: false,
            error: Some(error.into()),
            sentiment: data.sentiment(),
            data,
            timestamp: Utc::now(),
            source: "fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PlatformStats {
        serde_json::from_str(
            r#"{
                "tradeVolumes": {"combined": {"all": 1000}, "dex": {"all": "600"}, "curve": {"all": 400}},
                "tradeCounts": {"combined": {"all": 90}, "dex": {"all": 40}, "curve": {"all": 50}},
                "avgTradeSize": {"combined": 11.118, "dex": 15, "curve": 8},
                "usersCount": 321,
                "dexTokensCount": 4,
                "launchpadTokensCount": 77,
                "bondedPercentage": 5.1949,
                "tvl": {"total": 250, "breakdown": {}},
                "approxRevenues": {"dex": 1, "curve": 2, "total": 3}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn multiplies_only_value_metrics() {
        let metrics = MarketMetrics::from_stats(&stats(), 0.5);

        assert_eq!(metrics.total_volume, 500.0);
        assert_eq!(metrics.dex_volume, 300.0);
        assert_eq!(metrics.total_trade, 90.0);
        assert_eq!(metrics.avg_trade_size, 5.56);
        assert_eq!(metrics.total_users, 321.0);
        assert_eq!(metrics.bonding_percentage, 5.19);
        assert_eq!(metrics.tvl, 125.0);
        assert_eq!(metrics.total_revenue, 1.5);
    }

    #[test]
    fn empty_stats_do_not_fail() {
        let stats: PlatformStats = serde_json::from_str("{}").unwrap();
        let metrics = MarketMetrics::from_stats(&stats, 0.4);
        assert_eq!(metrics.total_volume, 0.0);
        assert_eq!(metrics.sentiment(), 0);
    }

    #[test]
    fn sentiment_is_bounded() {
        let mut metrics = MarketMetrics::fallback();
        metrics.total_volume = 1e12;
        metrics.total_trade = 1e12;
        metrics.total_users = 1e12;
        metrics.tvl = 1e12;
        metrics.total_revenue = 1e12;
        metrics.avg_trade_size = 1e12;
        assert_eq!(metrics.sentiment(), 100);
    }

    #[test]
    fn fallback_report_is_flagged() {
        let report = MarketMetricsReport::fallback("stats down");
        assert!(!report.success);
        assert_eq!(report.source, "fallback");
        assert_eq!(report.data.total_launch, 120.0);
    }
}
