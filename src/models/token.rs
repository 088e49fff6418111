use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// Token record as the launchpad search/trending endpoints return it.
///
/// Every field is optional upstream and several numeric fields arrive as
/// strings, so everything goes through the lenient deserializers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamToken {
    #[serde(default, deserialize_with = "lenient::string")]
    pub token_address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ticker: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image: String,
    #[serde(default)]
    pub socials: Option<Socials>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub progress: f64,
    #[serde(default)]
    pub volume: Value,
    #[serde(default)]
    pub trade_count: Value,
    #[serde(default)]
    pub price_change: Value,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Socials {
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub twitter: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub telegram: String,
}

impl UpstreamToken {
    /// All-time volume in native units (`volume.all`).
    pub fn volume_all(&self) -> f64 {
        lenient::windowed(&self.volume, "all")
    }

    /// All-time trade count (`tradeCount.all`).
    pub fn trade_count_all(&self) -> u64 {
        let count = lenient::windowed(&self.trade_count, "all");
        if count > 0.0 { count as u64 } else { 0 }
    }

    /// One hour price change. Trending records sometimes carry a bare number
    /// instead of the windowed object.
    pub fn price_change_1h(&self) -> f64 {
        lenient::windowed(&self.price_change, "1h")
    }
}

/// Raw `progress` value of a token whose curve has completed. Display
/// percent is derived separately and clamped, so it cannot decide this.
const GRADUATED_PROGRESS: f64 = 100.0;

/// Unit conversion applied to every upstream record of one fetch cycle.
#[derive(Debug, Clone)]
pub struct Conversion<'a> {
    pub usd_per_native: f64,
    pub image_gateway: &'a str,
    pub observed_at: DateTime<Utc>,
}

/// Normalized token shown in every collection grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_usd: f64,
    pub trade_count: u64,
    pub progress_percent: f64,
    /// Upstream reports exactly 100 once the bonding curve completes.
    #[serde(default)]
    pub graduated: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change: Option<f64>,
    /// Trades observed since the previous Last Trade poll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_trades: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trade_increase: Option<DateTime<Utc>>,
}

impl TokenSummary {
    pub fn from_upstream(raw: &UpstreamToken, conversion: &Conversion<'_>) -> Self {
        let price = conversion.usd_per_native;
        let socials = raw.socials.clone().unwrap_or_default();

        let created_at = DateTime::parse_from_rfc3339(raw.created_at.trim())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(conversion.observed_at);

        Self {
            id: raw.token_address.clone(),
            symbol: raw.ticker.clone(),
            name: raw.name.clone(),
            description: non_empty(&raw.description).map(str::to_string),
            icon_url: non_empty(&raw.image).map(|cid| {
                format!("{}/{}", conversion.image_gateway.trim_end_matches('/'), cid)
            }),
            website: non_empty(&socials.website).map(str::to_string),
            twitter: non_empty(&socials.twitter).map(|h| format!("https://twitter.com/{}", h)),
            telegram: non_empty(&socials.telegram).map(|h| format!("https://t.me/{}", h)),
            price_usd: raw.price * price,
            market_cap_usd: raw.market_cap * price,
            volume_usd: raw.volume_all() * price,
            trade_count: raw.trade_count_all(),
            progress_percent: (raw.progress * 100.0).clamp(0.0, 100.0),
            graduated: raw.progress == GRADUATED_PROGRESS,
            created_at,
            price_change: None,
            recent_trades: None,
            last_trade_increase: None,
        }
    }

    pub fn is_graduated(&self) -> bool {
        self.graduated
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
