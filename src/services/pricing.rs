use std::sync::Arc;

use crate::sources::TokenSource;

/// Native-token USD price lookup with a static fallback.
///
/// Every fetch cycle asks for a fresh price; nothing is cached between
/// categories.
#[derive(Clone)]
pub struct PriceOracle {
    source: Arc<dyn TokenSource>,
    fallback: f64,
}

impl PriceOracle {
    pub fn new(source: Arc<dyn TokenSource>, fallback: f64) -> Self {
        Self { source, fallback }
    }

    pub async fn usd_per_native(&self) -> f64 {
        match self.source.native_price().await {
            Ok(price) if price.is_finite() && price > 0.0 => price,
            Ok(price) => {
                tracing::warn!("Ignoring unusable native price {}, using fallback {}", price, self.fallback);
                self.fallback
            }
            Err(e) => {
                tracing::warn!("Price lookup via {} failed: {}, using fallback {}", self.source.name(), e, self.fallback);
                self.fallback
            }
        }
    }
}
