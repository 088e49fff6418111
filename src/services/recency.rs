use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::TokenSummary;
use super::ordering;

/// Trade counters seen by the previous Last Trade fetch, and when each token
/// last showed an increase.
#[derive(Debug, Clone, Default)]
pub struct TradeActivitySnapshot {
    counts: HashMap<String, u64>,
    increase_timestamps: HashMap<String, DateTime<Utc>>,
}

impl TradeActivitySnapshot {
    pub fn clear(&mut self) {
        self.counts.clear();
        self.increase_timestamps.clear();
    }

    #[cfg(test)]
    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    #[cfg(test)]
    pub fn increase_timestamps(&self) -> &HashMap<String, DateTime<Utc>> {
        &self.increase_timestamps
    }

    /// Cold pass: seed counters from this page and show it by volume.
    pub fn seed(&mut self, tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
        self.increase_timestamps.clear();
        self.counts = tokens.iter().map(|t| (t.id.clone(), t.trade_count)).collect();
        ordering::by_volume_desc(tokens)
    }

    /// Warm pass: tokens whose trade count rose since the last pass come
    /// first, then tokens with an older increase, then the rest newest first.
    /// Counters are replaced, so only the net change per poll is visible.
    pub fn rerank(&mut self, tokens: Vec<TokenSummary>, now: DateTime<Utc>) -> Vec<TokenSummary> {
        let mut latest = HashMap::with_capacity(tokens.len());
        let mut active = Vec::new();
        let mut rest = Vec::new();

        for mut token in tokens {
            latest.insert(token.id.clone(), token.trade_count);

            match self.counts.get(&token.id) {
                Some(&previous) if token.trade_count > previous => {
                    token.recent_trades = Some(token.trade_count - previous);
                    token.last_trade_increase = Some(now);
                    self.increase_timestamps.insert(token.id.clone(), now);
                    active.push(token);
                }
                _ => {
                    token.recent_trades = None;
                    token.last_trade_increase = self.increase_timestamps.get(&token.id).copied();
                    rest.push(token);
                }
            }
        }

        active.sort_by(|a, b| b.last_trade_increase.cmp(&a.last_trade_increase));
        rest.sort_by(|a, b| match (a.last_trade_increase, b.last_trade_increase) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        });

        self.counts = latest;
        active.extend(rest);
        active
    }
}
