use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Issued,
    Committed,
    Discarded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchCounts {
    pub issued: u64,
    pub committed: u64,
    pub discarded: u64,
    pub failed: u64,
}

/// Per-collection fetch counters for `/stats`.
#[derive(Default)]
pub struct FetchStats {
    by_category: DashMap<Category, FetchCounts>,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, category: Category, outcome: FetchOutcome) {
        let mut counts = self.by_category.entry(category).or_default();
        match outcome {
            FetchOutcome::Issued => counts.issued += 1,
            FetchOutcome::Committed => counts.committed += 1,
            FetchOutcome::Discarded => counts.discarded += 1,
            FetchOutcome::Failed => counts.failed += 1,
        }
    }

    pub fn get(&self, category: Category) -> FetchCounts {
        self.by_category.get(&category).map(|c| *c).unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, FetchCounts> {
        Category::ALL.iter().map(|c| (c.slug(), self.get(*c))).collect()
    }
}
