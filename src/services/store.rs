use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::models::{Category, CollectionPageState, TokenSummary};
use super::pump_soon::PumpSoonUniverse;
use super::recency::TradeActivitySnapshot;

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Mount or tab entry: back to page 1 behind a skeleton.
    Reset,
    /// Explicit page change: current items stay visible.
    Page,
    /// Background poll of the current page.
    Refresh,
}

/// Handle for one in-flight fetch. Only the ticket carrying the latest
/// generation of its category may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub category: Category,
    pub kind: FetchKind,
    pub page: u32,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct CategorySlot {
    state: CollectionPageState,
    generation: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
    slots: HashMap<Category, CategorySlot>,
    activity: TradeActivitySnapshot,
    universe: Option<PumpSoonUniverse>,
}

impl StoreInner {
    fn slot(&mut self, category: Category) -> &mut CategorySlot {
        self.slots.entry(category).or_default()
    }
}

/// Every collection's page state behind one lock, so the generation check
/// and the write it guards happen together.
#[derive(Debug, Default)]
pub struct CategoryStore {
    inner: Mutex<StoreInner>,
}

fn apply_page(state: &mut CollectionPageState, page: u32, items: Vec<TokenSummary>, has_more: bool) {
    state.items = items;
    state.has_more = has_more;
    state.current_page = page;
    state.total_pages = CollectionPageState::provisional_total_pages(page, has_more);
    state.is_initial_loading = false;
    state.is_page_loading = false;
    state.last_error = None;
}

impl CategoryStore {
    pub fn new() -> Self {
        let mut inner = StoreInner::default();
        for category in Category::ALL {
            inner.slot(category);
        }
        Self { inner: Mutex::new(inner) }
    }

    pub fn snapshot(&self, category: Category) -> CollectionPageState {
        self.inner.lock().slot(category).state.clone()
    }

    #[cfg(test)]
    pub fn activity(&self) -> TradeActivitySnapshot {
        self.inner.lock().activity.clone()
    }

    pub fn universe_len(&self) -> Option<usize> {
        self.inner.lock().universe.as_ref().map(PumpSoonUniverse::len)
    }

    /// Registers a reset or page fetch and flips the matching loading flag.
    /// Last Trade recency tracking restarts on both.
    pub fn begin(&self, category: Category, kind: FetchKind, page: u32) -> Ticket {
        let mut inner = self.inner.lock();
        if category == Category::LastTrade && kind != FetchKind::Refresh {
            inner.activity.clear();
        }

        let slot = inner.slot(category);
        slot.generation += 1;
        let page = match kind {
            FetchKind::Reset => {
                slot.state.current_page = 1;
                slot.state.is_initial_loading = true;
                1
            }
            FetchKind::Page => {
                slot.state.is_page_loading = true;
                page
            }
            FetchKind::Refresh => page,
        };

        Ticket { category, kind, page, generation: slot.generation }
    }

    /// Registers a poll of the current page, unless a reset or page fetch
    /// is still outstanding for the category.
    pub fn begin_refresh(&self, category: Category) -> Option<Ticket> {
        let mut inner = self.inner.lock();
        let slot = inner.slot(category);
        if slot.state.is_loading() {
            return None;
        }
        slot.generation += 1;
        Some(Ticket {
            category,
            kind: FetchKind::Refresh,
            page: slot.state.current_page,
            generation: slot.generation,
        })
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.inner.lock().slot(ticket.category).generation == ticket.generation
    }

    /// Replaces the page of a server-paginated collection. Returns false when
    /// a newer fetch superseded this one.
    pub fn commit_page(&self, ticket: &Ticket, items: Vec<TokenSummary>, has_more: bool) -> bool {
        let mut inner = self.inner.lock();
        let slot = inner.slot(ticket.category);
        if slot.generation != ticket.generation {
            return false;
        }
        apply_page(&mut slot.state, ticket.page, items, has_more);
        true
    }

    /// Last Trade commit: cold fetches seed the activity snapshot, polls
    /// re-rank against it.
    pub fn commit_last_trade(
        &self,
        ticket: &Ticket,
        tokens: Vec<TokenSummary>,
        has_more: bool,
        now: DateTime<Utc>,
    ) -> bool {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        let slot = inner.slots.entry(ticket.category).or_default();
        if slot.generation != ticket.generation {
            return false;
        }

        let items = match ticket.kind {
            FetchKind::Refresh => inner.activity.rerank(tokens, now),
            FetchKind::Reset | FetchKind::Page => inner.activity.seed(tokens),
        };
        apply_page(&mut slot.state, ticket.page, items, has_more);
        true
    }

    /// Caches a freshly built Pump Soon universe and shows its first page.
    pub fn commit_universe(&self, ticket: &Ticket, universe: PumpSoonUniverse) -> bool {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        let slot = inner.slots.entry(ticket.category).or_default();
        if slot.generation != ticket.generation {
            return false;
        }

        let state = &mut slot.state;
        state.items = universe.page(1).to_vec();
        state.current_page = 1;
        state.total_pages = universe.total_pages();
        state.has_more = universe.total_pages() > 1;
        state.is_initial_loading = false;
        state.is_page_loading = false;
        state.last_error = None;

        inner.universe = Some(universe);
        true
    }

    /// Shows another page of the cached universe. No network involved.
    pub fn show_universe_page(&self, page: u32) -> bool {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        let Some(universe) = inner.universe.as_ref() else {
            return false;
        };

        let state = &mut inner.slots.entry(Category::PumpSoon).or_default().state;
        state.items = universe.page(page).to_vec();
        state.current_page = page;
        state.total_pages = universe.total_pages();
        state.has_more = page < universe.total_pages();
        true
    }

    /// Clears loading flags after a failed fetch; items stay as they were.
    pub fn fail(&self, ticket: &Ticket, error: String) -> bool {
        let mut inner = self.inner.lock();
        let slot = inner.slot(ticket.category);
        if slot.generation != ticket.generation {
            return false;
        }
        slot.state.is_initial_loading = false;
        slot.state.is_page_loading = false;
        slot.state.last_error = Some(error);
        true
    }
}
