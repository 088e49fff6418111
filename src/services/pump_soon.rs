use std::collections::{HashMap, HashSet};

use crate::models::{Category, TokenSummary, UpstreamToken};
use crate::sources::{SourceError, TokenSource, TrendingToken};
use super::ordering;

/// Tokens that are both trending and in the newly created listing, best
/// performers first. Paginated in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpSoonUniverse {
    tokens: Vec<TokenSummary>,
    page_size: usize,
}

impl PumpSoonUniverse {
    pub fn from_candidates(
        trending: &[TrendingToken],
        newly_created: Vec<TokenSummary>,
        page_size: usize,
    ) -> Self {
        let changes: HashMap<&str, f64> = trending
            .iter()
            .map(|t| (t.id.as_str(), t.price_change))
            .collect();

        // the newly created listing shifts while we walk it, so a token can
        // show up on two consecutive pages
        let mut seen = HashSet::new();
        let matching: Vec<TokenSummary> = newly_created
            .into_iter()
            .filter_map(|mut token| {
                let change = *changes.get(token.id.as_str())?;
                if !seen.insert(token.id.clone()) {
                    return None;
                }
                token.price_change = Some(change);
                Some(token)
            })
            .collect();

        Self {
            tokens: ordering::by_price_change_desc(matching),
            page_size: page_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.tokens.len().div_ceil(self.page_size) as u32
    }

    /// Items of a 1-based page; empty past the end.
    pub fn page(&self, page: u32) -> &[TokenSummary] {
        let start = (page.max(1) as usize - 1) * self.page_size;
        if start >= self.tokens.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.tokens.len());
        &self.tokens[start..end]
    }
}

/// Walks the newly created listing until upstream reports no more pages.
pub async fn collect_newly_created(
    source: &dyn TokenSource,
    max_pages: u32,
) -> Result<Vec<UpstreamToken>, SourceError> {
    let sort = Category::PumpSoon.sort_key();
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let result = source.search(sort, page).await?;
        records.extend(result.tokens);

        if !result.has_more {
            break;
        }
        if page >= max_pages {
            tracing::warn!("Pump Soon scan stopped at page cap {}", max_pages);
            break;
        }
        page += 1;
    }

    tracing::debug!("Pump Soon scan: {} records over {} pages", records.len(), page);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortKey;
    use crate::services::ordering::tests::summary;
    use crate::sources::mock::{token, ScriptedSource};

    fn trending(ids: &[(&str, f64)]) -> Vec<TrendingToken> {
        ids.iter()
            .map(|(id, change)| TrendingToken { id: id.to_string(), price_change: *change })
            .collect()
    }

    fn universe_of(n: usize) -> PumpSoonUniverse {
        let ids: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
        let trending: Vec<TrendingToken> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| TrendingToken { id: id.clone(), price_change: i as f64 })
            .collect();
        let created = ids.iter().map(|id| summary(id, 0.0, 0)).collect();
        PumpSoonUniverse::from_candidates(&trending, created, 20)
    }

    #[test]
    fn intersects_and_sorts_by_price_change() {
        let created = vec![summary("a", 0.0, 0), summary("b", 0.0, 0), summary("c", 0.0, 0)];
        let universe = PumpSoonUniverse::from_candidates(
            &trending(&[("c", 40.0), ("a", -2.0), ("z", 99.0)]),
            created,
            20,
        );

        let ids: Vec<_> = universe.page(1).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(universe.page(1)[0].price_change, Some(40.0));
    }

    #[test]
    fn duplicate_listing_entries_are_kept_once() {
        let created = vec![summary("a", 0.0, 0), summary("a", 0.0, 0)];
        let universe = PumpSoonUniverse::from_candidates(&trending(&[("a", 1.0)]), created, 20);
        assert_eq!(universe.len(), 1);
    }

    #[test]
    fn forty_five_tokens_make_three_pages() {
        let universe = universe_of(45);
        assert_eq!(universe.total_pages(), 3);
        assert_eq!(universe.page(1).len(), 20);
        assert_eq!(universe.page(3).len(), 5);
        assert!(universe.page(4).is_empty());
    }

    #[test]
    fn slicing_is_pure() {
        let universe = universe_of(45);
        assert_eq!(universe.page(2), universe.page(2));
        assert_eq!(universe.page(2)[0].id, universe_of(45).page(2)[0].id);
    }

    #[test]
    fn empty_universe_has_no_pages() {
        let universe = universe_of(0);
        assert!(universe.is_empty());
        assert_eq!(universe.total_pages(), 0);
        assert!(universe.page(1).is_empty());
    }

    #[tokio::test]
    async fn scan_follows_has_more() {
        let source = ScriptedSource::new();
        source.set_page(SortKey::NewlyCreated, 1, vec![token("a", 0, 0.0)], true);
        source.set_page(SortKey::NewlyCreated, 2, vec![token("b", 0, 0.0)], true);
        source.set_page(SortKey::NewlyCreated, 3, vec![token("c", 0, 0.0)], false);

        let records = collect_newly_created(&source, 10).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(source.calls(SortKey::NewlyCreated), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn scan_respects_page_cap() {
        let source = ScriptedSource::new();
        for page in 1..=5 {
            source.set_page(SortKey::NewlyCreated, page, vec![token("x", 0, 0.0)], true);
        }

        let records = collect_newly_created(&source, 2).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn scan_fails_when_a_page_fails() {
        let source = ScriptedSource::new();
        source.fail_search(true);
        assert!(collect_newly_created(&source, 10).await.is_err());
    }
}
