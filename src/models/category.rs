use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sort orders the launchpad search endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    NewlyCreated,
    MarketCapHighToLow,
    ProgressHighToLow,
    VolumeHighToLow,
    PriceHighToLow,
    PriceLowToHigh,
}

impl SortKey {
    /// Query value expected by `tokens/search?sortBy=`.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::NewlyCreated => "Newly Created",
            SortKey::MarketCapHighToLow => "Market Cap (High to Low)",
            SortKey::ProgressHighToLow => "Progress (High to Low)",
            SortKey::VolumeHighToLow => "Volume (High to Low)",
            SortKey::PriceHighToLow => "Price (High to Low)",
            SortKey::PriceLowToHigh => "Price (Low to High)",
        }
    }
}

/// The six token collections of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Volume,
    MarketCap,
    Graduated,
    LastTrade,
    Fresh,
    PumpSoon,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Volume,
        Category::MarketCap,
        Category::Graduated,
        Category::LastTrade,
        Category::Fresh,
        Category::PumpSoon,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Volume => "volume",
            Category::MarketCap => "market-cap",
            Category::Graduated => "graduated",
            Category::LastTrade => "last-trade",
            Category::Fresh => "fresh",
            Category::PumpSoon => "pump-soon",
        }
    }

    /// Upstream order requested for a page of this collection. Pump Soon
    /// walks the newly created listing to build its universe.
    pub fn sort_key(&self) -> SortKey {
        match self {
            Category::Volume => SortKey::NewlyCreated,
            Category::MarketCap => SortKey::MarketCapHighToLow,
            Category::Graduated => SortKey::ProgressHighToLow,
            Category::LastTrade => SortKey::VolumeHighToLow,
            Category::Fresh => SortKey::NewlyCreated,
            Category::PumpSoon => SortKey::NewlyCreated,
        }
    }

    /// Pump Soon is paginated in memory; everything else pages upstream.
    pub fn is_client_paginated(&self) -> bool {
        matches!(self, Category::PumpSoon)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

/// Navigation target: the overview page or one of the collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Overview,
    Collection(Category),
}

impl Tab {
    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Collection(category) => category.slug(),
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Tab::Overview => None,
            Tab::Collection(category) => Some(*category),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "overview" {
            return Ok(Tab::Overview);
        }
        s.parse().map(Tab::Collection)
    }
}

impl Serialize for Tab {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab: {0}")]
pub struct UnknownTab(pub String);
