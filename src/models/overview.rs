use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MarketMetricsReport, TokenSummary};

/// Latency value reported when a probe cannot complete.
pub const PROBE_FAILURE_MS: u64 = 999;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movers {
    pub top_gainers: Vec<TokenSummary>,
    pub top_losers: Vec<TokenSummary>,
    pub new_listings: Vec<TokenSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => HealthStatus::Poor,
            40..=59 => HealthStatus::Fair,
            60..=79 => HealthStatus::Good,
            _ => HealthStatus::Excellent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHealth {
    pub latency_ms: u64,
    pub api_response_ms: u64,
    pub download_kbps: u64,
    pub upload_kbps: u64,
    pub overall_health: u8,
    pub status: HealthStatus,
    pub checked_at: Option<DateTime<Utc>>,
}

impl Default for NetworkHealth {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            api_response_ms: 0,
            download_kbps: 0,
            upload_kbps: 0,
            overall_health: 0,
            status: HealthStatus::Unknown,
            checked_at: None,
        }
    }
}

impl NetworkHealth {
    pub fn from_samples(latency_ms: u64, api_response_ms: u64, download_kbps: u64, checked_at: DateTime<Utc>) -> Self {
        let latency_score = (100.0 - latency_ms as f64 / 10.0).max(0.0);
        let api_score = (100.0 - api_response_ms as f64 / 20.0).max(0.0);
        let speed_score = (download_kbps as f64).min(100.0);
        let overall = ((latency_score + api_score + speed_score) / 3.0).round() as u8;

        Self {
            latency_ms,
            api_response_ms,
            download_kbps,
            upload_kbps: (download_kbps as f64 * 0.8).round() as u64,
            overall_health: overall,
            status: HealthStatus::from_score(overall),
            checked_at: Some(checked_at),
        }
    }
}

/// State of the overview tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewState {
    pub metrics: MarketMetricsReport,
    pub movers: Movers,
    pub network: NetworkHealth,
    pub is_loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for OverviewState {
    fn default() -> Self {
        Self {
            metrics: MarketMetricsReport::fallback("not loaded yet"),
            movers: Movers::default(),
            network: NetworkHealth::default(),
            is_loading: false,
            last_updated: None,
        }
    }
}
