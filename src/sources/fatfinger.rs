use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::models::{lenient, PlatformStats, SortKey, UpstreamToken};
use super::{ProbeResponse, SearchPage, SourceError, TokenSource, TrendingToken};

/// REST client for the launchpad API (search, trending, stats, price).
pub struct FatFingerSource {
    client: Client,
    base_url: String,
    view: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    result: Option<Vec<UpstreamToken>>,
    #[serde(default, deserialize_with = "lenient::flag")]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    result: Option<Vec<UpstreamToken>>,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    price: Value,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    success: Option<bool>,
    data: Option<PlatformStats>,
}

impl FatFingerSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            view: config.view.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Response, SourceError> {
        let resp = self.client.get(self.url(path))
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == 429 {
            return Err(SourceError::RateLimit);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, SourceError> {
        self.send(path, query)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

fn into_search_page(resp: SearchResponse) -> Result<SearchPage, SourceError> {
    let tokens = resp.result
        .ok_or_else(|| SourceError::Parse("search response without result array".to_string()))?;
    Ok(SearchPage { tokens, has_more: resp.has_more })
}

fn into_trending(resp: TrendingResponse) -> Result<Vec<TrendingToken>, SourceError> {
    let tokens = resp.result
        .ok_or_else(|| SourceError::Parse("trending response without result array".to_string()))?;
    Ok(tokens.into_iter()
        .filter(|t| !t.token_address.is_empty())
        .map(|t| TrendingToken { price_change: t.price_change_1h(), id: t.token_address })
        .collect())
}

fn into_price(resp: PriceResponse) -> Result<f64, SourceError> {
    if resp.success == Some(false) {
        return Err(SourceError::Unsuccessful("price".to_string()));
    }
    let price = lenient::as_f64(&resp.price);
    if price > 0.0 {
        Ok(price)
    } else {
        Err(SourceError::Parse(format!("unusable price: {}", resp.price)))
    }
}

fn into_stats(resp: StatsResponse) -> Result<PlatformStats, SourceError> {
    if resp.success == Some(false) {
        return Err(SourceError::Unsuccessful("stats".to_string()));
    }
    resp.data.ok_or_else(|| SourceError::Parse("stats response without data".to_string()))
}

#[async_trait]
impl TokenSource for FatFingerSource {
    fn name(&self) -> &'static str {
        "FatFinger"
    }

    async fn search(&self, sort: SortKey, page: u32) -> Result<SearchPage, SourceError> {
        let query = [
            ("sortBy", sort.label().to_string()),
            ("view", self.view.clone()),
            ("page", page.to_string()),
        ];
        let resp: SearchResponse = self.get_json("tokens/search", &query).await?;
        tracing::trace!("search {:?} page {} -> {} tokens", sort, page, resp.result.as_ref().map_or(0, Vec::len));
        into_search_page(resp)
    }

    async fn trending(&self) -> Result<Vec<TrendingToken>, SourceError> {
        into_trending(self.get_json("tokens/trending", &[]).await?)
    }

    async fn native_price(&self) -> Result<f64, SourceError> {
        into_price(self.get_json("network/info/price", &[]).await?)
    }

    async fn stats(&self) -> Result<PlatformStats, SourceError> {
        into_stats(self.get_json("stats", &[]).await?)
    }

    async fn probe(&self) -> Result<ProbeResponse, SourceError> {
        let resp = self.send("network/info/price", &[]).await?;
        let is_json = resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let declared = resp.content_length();
        let body = resp.bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(ProbeResponse {
            is_json,
            bytes: declared.or(Some(body.len() as u64)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_reads_has_more() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"success": true, "result": [{"tokenAddress": "a"}, {"tokenAddress": "b"}], "hasMore": true}"#,
        )
        .unwrap();
        let page = into_search_page(resp).unwrap();
        assert_eq!(page.tokens.len(), 2);
        assert!(page.has_more);
    }

    #[test]
    fn search_without_result_is_an_error() {
        let resp: SearchResponse = serde_json::from_str(r#"{"success": false, "error": "boom"}"#).unwrap();
        assert!(matches!(into_search_page(resp), Err(SourceError::Parse(_))));
    }

    #[test]
    fn missing_has_more_means_last_page() {
        let resp: SearchResponse = serde_json::from_str(r#"{"result": [], "hasMore": null}"#).unwrap();
        assert!(!into_search_page(resp).unwrap().has_more);
    }

    #[test]
    fn trending_skips_records_without_address() {
        let resp: TrendingResponse = serde_json::from_str(
            r#"{"result": [{"tokenAddress": "a", "priceChange": {"1h": 5}}, {"priceChange": 9}]}"#,
        )
        .unwrap();
        let trending = into_trending(resp).unwrap();
        assert_eq!(trending, vec![TrendingToken { id: "a".into(), price_change: 5.0 }]);
    }

    #[test]
    fn price_accepts_string_and_rejects_zero() {
        let ok: PriceResponse = serde_json::from_str(r#"{"success": true, "price": "3.21"}"#).unwrap();
        assert_eq!(into_price(ok).unwrap(), 3.21);

        let zero: PriceResponse = serde_json::from_str(r#"{"success": true, "price": 0}"#).unwrap();
        assert!(into_price(zero).is_err());

        let failed: PriceResponse = serde_json::from_str(r#"{"success": false, "price": 1}"#).unwrap();
        assert!(matches!(into_price(failed), Err(SourceError::Unsuccessful(_))));
    }

    #[test]
    fn stats_require_data() {
        let resp: StatsResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(into_stats(resp).is_err());

        let resp: StatsResponse = serde_json::from_str(r#"{"success": true, "data": {"usersCount": 3}}"#).unwrap();
        assert_eq!(into_stats(resp).unwrap().users_count, 3.0);
    }
}
