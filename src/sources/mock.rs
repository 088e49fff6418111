//! Scripted in-memory source for controller tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::models::{PlatformStats, SortKey, UpstreamToken};
use super::{ProbeResponse, SearchPage, SourceError, TokenSource, TrendingToken};

pub fn token(id: &str, trade_count: u64, volume: f64) -> UpstreamToken {
    UpstreamToken {
        token_address: id.to_string(),
        ticker: id.to_uppercase(),
        name: format!("{} token", id),
        volume: json!({ "all": volume }),
        trade_count: json!({ "all": trade_count }),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<(SortKey, u32), SearchPage>>,
    gates: Mutex<HashMap<(SortKey, u32), Arc<Notify>>>,
    calls: Mutex<Vec<(SortKey, u32)>>,
    trending: Mutex<Vec<TrendingToken>>,
    stats: Mutex<Option<PlatformStats>>,
    price: Mutex<Option<f64>>,
    fail_search: AtomicBool,
    fail_trending: AtomicBool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        let source = Self::default();
        *source.price.lock() = Some(1.0);
        source
    }

    pub fn set_page(&self, sort: SortKey, page: u32, tokens: Vec<UpstreamToken>, has_more: bool) {
        self.pages.lock().insert((sort, page), SearchPage { tokens, has_more });
    }

    pub fn set_trending(&self, trending: Vec<TrendingToken>) {
        *self.trending.lock() = trending;
    }

    pub fn set_price(&self, price: Option<f64>) {
        *self.price.lock() = price;
    }

    pub fn set_stats(&self, stats: Option<PlatformStats>) {
        *self.stats.lock() = stats;
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn fail_trending(&self, fail: bool) {
        self.fail_trending.store(fail, Ordering::SeqCst);
    }

    /// Holds searches for `(sort, page)` until the returned handle is notified.
    pub fn gate(&self, sort: SortKey, page: u32) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert((sort, page), notify.clone());
        notify
    }

    pub fn calls(&self, sort: SortKey) -> Vec<u32> {
        self.calls.lock().iter().filter(|(s, _)| *s == sort).map(|(_, p)| *p).collect()
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn search(&self, sort: SortKey, page: u32) -> Result<SearchPage, SourceError> {
        self.calls.lock().push((sort, page));
        let gate = self.gates.lock().remove(&(sort, page));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SourceError::Status(502));
        }
        Ok(self.pages.lock().get(&(sort, page)).cloned().unwrap_or_default())
    }

    async fn trending(&self) -> Result<Vec<TrendingToken>, SourceError> {
        if self.fail_trending.load(Ordering::SeqCst) {
            return Err(SourceError::Network("trending down".to_string()));
        }
        Ok(self.trending.lock().clone())
    }

    async fn native_price(&self) -> Result<f64, SourceError> {
        let price = *self.price.lock();
        price.ok_or_else(|| SourceError::Network("price down".to_string()))
    }

    async fn stats(&self) -> Result<PlatformStats, SourceError> {
        let stats = self.stats.lock().clone();
        stats.ok_or(SourceError::Status(500))
    }

    async fn probe(&self) -> Result<ProbeResponse, SourceError> {
        let price = *self.price.lock();
        match price {
            Some(_) => Ok(ProbeResponse { is_json: true, bytes: Some(64) }),
            None => Err(SourceError::Network("probe failed".to_string())),
        }
    }
}
