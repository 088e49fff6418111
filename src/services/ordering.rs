use crate::models::{Category, TokenSummary};

/// Page-local filtering and ordering applied after a page is normalized.
pub fn arrange_page(category: Category, tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
    match category {
        Category::Volume | Category::LastTrade => by_volume_desc(tokens),
        Category::MarketCap => by_market_cap_desc(tokens),
        Category::Graduated => {
            let graduated = tokens.into_iter().filter(TokenSummary::is_graduated).collect();
            by_created_desc(graduated)
        }
        Category::Fresh => by_created_desc(tokens),
        Category::PumpSoon => by_price_change_desc(tokens),
    }
}

pub fn by_volume_desc(mut tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
    tokens.sort_by(|a, b| b.volume_usd.total_cmp(&a.volume_usd));
    tokens
}

pub fn by_market_cap_desc(mut tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
    tokens.sort_by(|a, b| b.market_cap_usd.total_cmp(&a.market_cap_usd));
    tokens
}

pub fn by_created_desc(mut tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
    tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tokens
}

pub fn by_price_change_desc(mut tokens: Vec<TokenSummary>) -> Vec<TokenSummary> {
    tokens.sort_by(|a, b| {
        b.price_change.unwrap_or(0.0).total_cmp(&a.price_change.unwrap_or(0.0))
    });
    tokens
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn summary(id: &str, volume: f64, trades: u64) -> TokenSummary {
        TokenSummary {
            id: id.to_string(),
            symbol: id.to_uppercase(),
            name: id.to_string(),
            description: None,
            icon_url: None,
            website: None,
            twitter: None,
            telegram: None,
            price_usd: 0.0,
            market_cap_usd: 0.0,
            volume_usd: volume,
            trade_count: trades,
            progress_percent: 0.0,
            graduated: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            price_change: None,
            recent_trades: None,
            last_trade_increase: None,
        }
    }

    fn ids(tokens: &[TokenSummary]) -> Vec<&str> {
        tokens.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn graduated_keeps_only_complete_curves_newest_first() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut old = summary("old", 0.0, 0);
        old.graduated = true;
        let mut new = summary("new", 0.0, 0);
        new.graduated = true;
        new.created_at = base + Duration::hours(1);
        let mut bonding = summary("bonding", 0.0, 0);
        bonding.progress_percent = 100.0;

        let page = arrange_page(Category::Graduated, vec![old, bonding, new]);
        assert_eq!(ids(&page), vec!["new", "old"]);
    }

    #[test]
    fn volume_orders_by_usd_volume() {
        let page = arrange_page(
            Category::Volume,
            vec![summary("a", 5.0, 0), summary("b", 50.0, 0), summary("c", 0.5, 0)],
        );
        assert_eq!(ids(&page), vec!["b", "a", "c"]);
    }

    #[test]
    fn market_cap_orders_descending() {
        let mut small = summary("small", 0.0, 0);
        small.market_cap_usd = 10.0;
        let mut big = summary("big", 0.0, 0);
        big.market_cap_usd = 1_000.0;
        let page = arrange_page(Category::MarketCap, vec![small, big]);
        assert_eq!(ids(&page), vec!["big", "small"]);
    }
}
