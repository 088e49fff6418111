use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::time::Duration;

use crate::config::Config;
use crate::models::{
    Category, CollectionPageState, Conversion, OverviewState, Tab, TokenSummary, UpstreamToken,
};
use crate::sources::TokenSource;
use super::ordering::arrange_page;
use super::overview::OverviewService;
use super::poller::Poller;
use super::pricing::PriceOracle;
use super::pump_soon::{collect_newly_created, PumpSoonUniverse};
use super::stats::{FetchOutcome, FetchStats};
use super::store::{CategoryStore, FetchKind, Ticket};

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub page_size: usize,
    pub poll_interval: Duration,
    pub overview_interval: Duration,
    pub movers_limit: usize,
    pub pump_soon_max_pages: u32,
    pub fallback_price: f64,
    pub image_gateway: String,
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.dashboard.page_size,
            poll_interval: Duration::from_secs(config.dashboard.poll_interval_secs),
            overview_interval: Duration::from_secs(config.dashboard.overview_interval_secs),
            movers_limit: config.dashboard.movers_limit,
            pump_soon_max_pages: config.pump_soon.max_pages,
            fallback_price: config.upstream.fallback_price,
            image_gateway: config.upstream.image_gateway.clone(),
        }
    }
}

/// Everything that can move the dashboard from one state to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    TabSelected(Tab),
    /// Page change on whichever tab is active.
    PageRequested(u32),
    PollTick(Tab),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("pages start at 1")]
    InvalidPage,
    #[error("{0} has no pages")]
    NotPaginated(Tab),
    #[error("page {page} is beyond the last page ({total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },
    #[error("pump-soon universe is still being built")]
    UniverseNotReady,
}

/// Pagination controls for the active collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<&CollectionPageState> for Pager {
    fn from(state: &CollectionPageState) -> Self {
        Self {
            current_page: state.current_page,
            total_pages: state.total_pages,
            has_next: state.has_next(),
            has_previous: state.has_previous(),
        }
    }
}

/// What the active tab currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tab: Tab,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<OverviewState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionPageState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pager: Option<Pager>,
    pub generated_at: DateTime<Utc>,
}

/// Owns every collection's page state and decides when to fetch.
///
/// Mount loads every collection; after that only the active tab is fetched.
/// Each fetch carries a generation
/// ticket from the category store, so a response that arrives after a newer
/// fetch was issued for the same category is dropped instead of committed.
pub struct DashboardController {
    source: Arc<dyn TokenSource>,
    oracle: PriceOracle,
    overview_service: OverviewService,
    store: CategoryStore,
    overview: RwLock<OverviewState>,
    overview_generation: AtomicU64,
    active: RwLock<Tab>,
    poller: Mutex<Option<Poller>>,
    stats: FetchStats,
    settings: DashboardSettings,
    this: Weak<DashboardController>,
}

impl DashboardController {
    pub fn new(source: Arc<dyn TokenSource>, settings: DashboardSettings) -> Arc<Self> {
        let oracle = PriceOracle::new(source.clone(), settings.fallback_price);
        let overview_service = OverviewService::new(
            source.clone(),
            oracle.clone(),
            settings.image_gateway.clone(),
            settings.movers_limit,
        );

        Arc::new_cyclic(|this| Self {
            source,
            oracle,
            overview_service,
            store: CategoryStore::new(),
            overview: RwLock::new(OverviewState::default()),
            overview_generation: AtomicU64::new(0),
            active: RwLock::new(Tab::default()),
            poller: Mutex::new(None),
            stats: FetchStats::new(),
            settings,
            this: this.clone(),
        })
    }

    /// Initial load. Every collection goes back to page 1 behind a skeleton
    /// and is fetched concurrently, Pump Soon included, while the default
    /// tab becomes active.
    pub async fn mount(&self) {
        let tab = self.active_tab();
        tracing::info!("Mounting dashboard on {}", tab);
        self.activate(tab);

        let tickets: Vec<Ticket> = Category::ALL
            .iter()
            .map(|category| self.store.begin(*category, FetchKind::Reset, 1))
            .collect();
        let mut loads: Vec<BoxFuture<'_, ()>> = tickets
            .into_iter()
            .map(|ticket| match ticket.category {
                Category::PumpSoon => self.build_universe(ticket).boxed(),
                _ => self.fetch_page(ticket).boxed(),
            })
            .collect();
        if tab == Tab::Overview {
            loads.push(self.refresh_overview().boxed());
        }

        join_all(loads).await;
        tracing::info!("Dashboard mounted");
    }

    pub async fn handle(&self, event: DashboardEvent) -> Result<(), ControllerError> {
        match event {
            DashboardEvent::TabSelected(tab) => {
                self.select_tab(tab).await;
                Ok(())
            }
            DashboardEvent::PageRequested(page) => self.request_page(page).await,
            DashboardEvent::PollTick(tab) => {
                self.poll(tab).await;
                Ok(())
            }
        }
    }

    /// Activates `tab`, replaces the background poller and reloads the tab
    /// from its first page.
    pub async fn select_tab(&self, tab: Tab) {
        self.activate(tab);
        tracing::debug!("Tab selected: {}", tab);

        match tab {
            Tab::Overview => self.refresh_overview().await,
            Tab::Collection(Category::PumpSoon) => {
                let ticket = self.store.begin(Category::PumpSoon, FetchKind::Reset, 1);
                self.build_universe(ticket).await;
            }
            Tab::Collection(category) => {
                let ticket = self.store.begin(category, FetchKind::Reset, 1);
                self.fetch_page(ticket).await;
            }
        }
    }

    /// Validates a page change for the active tab without touching state.
    pub fn check_page(&self, page: u32) -> Result<Category, ControllerError> {
        if page == 0 {
            return Err(ControllerError::InvalidPage);
        }
        let tab = self.active_tab();
        let category = tab.category().ok_or(ControllerError::NotPaginated(tab))?;

        if category.is_client_paginated() && self.store.universe_len().is_none() {
            return Err(ControllerError::UniverseNotReady);
        }
        let total_pages = self.store.snapshot(category).total_pages;
        if page > total_pages {
            return Err(ControllerError::PageOutOfRange { page, total_pages });
        }
        Ok(category)
    }

    /// Moves the active collection to `page`. Pump Soon slices its cached
    /// universe; every other collection refetches with its items still shown.
    pub async fn request_page(&self, page: u32) -> Result<(), ControllerError> {
        let category = self.check_page(page)?;

        if category.is_client_paginated() {
            if !self.store.show_universe_page(page) {
                return Err(ControllerError::UniverseNotReady);
            }
            tracing::debug!("Pump Soon page {} served from cache", page);
            return Ok(());
        }

        let ticket = self.store.begin(category, FetchKind::Page, page);
        self.fetch_page(ticket).await;
        Ok(())
    }

    /// Background refresh. Ticks for a tab that is no longer active are ignored.
    pub async fn poll(&self, tab: Tab) {
        if self.active_tab() != tab {
            tracing::trace!("Ignoring poll for inactive tab {}", tab);
            return;
        }

        match tab {
            Tab::Overview => self.refresh_overview().await,
            Tab::Collection(Category::LastTrade) => {
                match self.store.begin_refresh(Category::LastTrade) {
                    Some(ticket) => self.fetch_page(ticket).await,
                    None => tracing::debug!("Last Trade poll skipped, cold fetch in flight"),
                }
            }
            Tab::Collection(_) => {}
        }
    }

    fn poll_period(&self, tab: Tab) -> Option<Duration> {
        match tab {
            Tab::Overview => Some(self.settings.overview_interval),
            Tab::Collection(Category::LastTrade) => Some(self.settings.poll_interval),
            Tab::Collection(_) => None,
        }
    }

    fn activate(&self, tab: Tab) {
        *self.active.write() = tab;
        self.restart_poller(tab);
    }

    fn restart_poller(&self, tab: Tab) {
        let mut slot = self.poller.lock();
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        let Some(period) = self.poll_period(tab) else {
            return;
        };
        let this = self.this.clone();
        *slot = Some(Poller::start(tab, period, move || {
            let this = this.clone();
            async move {
                if let Some(controller) = this.upgrade() {
                    if let Err(e) = controller.handle(DashboardEvent::PollTick(tab)).await {
                        tracing::warn!("Poll tick for {} failed: {}", tab, e);
                    }
                }
            }
        }));
    }

    async fn fetch_page(&self, ticket: Ticket) {
        let category = ticket.category;
        self.stats.record(category, FetchOutcome::Issued);
        tracing::debug!(
            "Fetching {} page {} ({:?}, generation {})",
            category, ticket.page, ticket.kind, ticket.generation
        );

        let (result, price) = tokio::join!(
            self.source.search(category.sort_key(), ticket.page),
            self.oracle.usd_per_native(),
        );

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("{} page {} failed: {}", category, ticket.page, e);
                self.record_failure(&ticket, e.to_string());
                return;
            }
        };

        if !self.store.is_current(&ticket) {
            self.record_commit(&ticket, false);
            return;
        }

        let now = Utc::now();
        let tokens = self.summarize(&page.tokens, price, now);
        let committed = match category {
            Category::LastTrade => self.store.commit_last_trade(&ticket, tokens, page.has_more, now),
            _ => self.store.commit_page(&ticket, arrange_page(category, tokens), page.has_more),
        };
        self.record_commit(&ticket, committed);
    }

    async fn build_universe(&self, ticket: Ticket) {
        self.stats.record(ticket.category, FetchOutcome::Issued);
        tracing::debug!("Building Pump Soon universe (generation {})", ticket.generation);

        let (trending, created, price) = tokio::join!(
            self.source.trending(),
            collect_newly_created(self.source.as_ref(), self.settings.pump_soon_max_pages),
            self.oracle.usd_per_native(),
        );

        let (trending, created) = match (trending, created) {
            (Ok(trending), Ok(created)) => (trending, created),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Pump Soon universe build failed: {}", e);
                self.record_failure(&ticket, e.to_string());
                return;
            }
        };

        let summaries = self.summarize(&created, price, Utc::now());
        let universe = PumpSoonUniverse::from_candidates(&trending, summaries, self.settings.page_size);
        if universe.is_empty() {
            tracing::info!("Pump Soon universe is empty, none of {} trending tokens is newly created", trending.len());
        } else {
            tracing::info!(
                "Pump Soon universe: {} of {} trending tokens, {} pages",
                universe.len(), trending.len(), universe.total_pages()
            );
        }

        let committed = self.store.commit_universe(&ticket, universe);
        self.record_commit(&ticket, committed);
    }

    /// Reloads metrics, movers and network health together. Movers keep their
    /// previous value when the listing calls fail.
    pub async fn refresh_overview(&self) {
        let generation = self.overview_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.overview.write().is_loading = true;

        let (metrics, movers, network) = tokio::join!(
            self.overview_service.market_metrics(),
            self.overview_service.movers(),
            self.overview_service.network_health(),
        );

        if self.overview_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Dropping stale overview refresh {}", generation);
            return;
        }

        let mut overview = self.overview.write();
        overview.metrics = metrics;
        match movers {
            Ok(movers) => overview.movers = movers,
            Err(e) => tracing::warn!("Movers unavailable: {}", e),
        }
        overview.network = network;
        overview.is_loading = false;
        overview.last_updated = Some(Utc::now());
    }

    fn summarize(
        &self,
        raw: &[UpstreamToken],
        usd_per_native: f64,
        now: DateTime<Utc>,
    ) -> Vec<TokenSummary> {
        let conversion = Conversion {
            usd_per_native,
            image_gateway: &self.settings.image_gateway,
            observed_at: now,
        };
        raw.iter().map(|token| TokenSummary::from_upstream(token, &conversion)).collect()
    }

    fn record_commit(&self, ticket: &Ticket, committed: bool) {
        if committed {
            self.stats.record(ticket.category, FetchOutcome::Committed);
        } else {
            tracing::debug!(
                "Discarding stale {} response (generation {})",
                ticket.category, ticket.generation
            );
            self.stats.record(ticket.category, FetchOutcome::Discarded);
        }
    }

    fn record_failure(&self, ticket: &Ticket, error: String) {
        if self.store.fail(ticket, error) {
            self.stats.record(ticket.category, FetchOutcome::Failed);
        } else {
            self.stats.record(ticket.category, FetchOutcome::Discarded);
        }
    }

    pub fn active_tab(&self) -> Tab {
        *self.active.read()
    }

    /// Tab the background poller is currently bound to, if any.
    pub fn polling(&self) -> Option<Tab> {
        self.poller.lock().as_ref().map(Poller::tab)
    }

    pub fn category(&self, category: Category) -> CollectionPageState {
        self.store.snapshot(category)
    }

    pub fn overview(&self) -> OverviewState {
        self.overview.read().clone()
    }

    pub fn overview_service(&self) -> &OverviewService {
        &self.overview_service
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    pub fn view(&self) -> DashboardView {
        let tab = self.active_tab();
        let collection = tab.category().map(|c| self.category(c));
        DashboardView {
            tab,
            overview: match tab {
                Tab::Overview => Some(self.overview()),
                Tab::Collection(_) => None,
            },
            pager: collection.as_ref().map(Pager::from),
            collection,
            generated_at: Utc::now(),
        }
    }
}
