use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::time::Duration;
use tower_http::cors::CorsLayer;

use crate::models::{Category, CollectionPageState, OverviewState, Tab};
use crate::services::{DashboardController, DashboardEvent, DashboardView};
use super::error::ApiError;
use super::websocket::ws_handler;

pub struct AppState {
    pub controller: Arc<DashboardController>,
    pub push_interval: Duration,
}

/// Hands an event to the controller without holding the request open.
pub(crate) fn dispatch(controller: &Arc<DashboardController>, event: DashboardEvent) {
    let controller = controller.clone();
    tokio::spawn(async move {
        if let Err(e) = controller.handle(event).await {
            tracing::warn!("{:?} rejected: {}", event, e);
        }
    });
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

/// GET /api/dashboard
async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.controller.view())
}

/// GET /api/categories/{category}
async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<CollectionPageState>, ApiError> {
    let category: Category = slug.parse()?;
    Ok(Json(state.controller.category(category)))
}

/// POST /api/tabs/{tab}
async fn select_tab(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tab: Tab = slug.parse()?;
    dispatch(&state.controller, DashboardEvent::TabSelected(tab));
    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({ "tab": tab }))))
}

/// POST /api/page/{page}
async fn request_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.controller.check_page(page)?;
    dispatch(&state.controller, DashboardEvent::PageRequested(page));
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "category": category, "page": page })),
    ))
}

/// GET /api/overview
async fn get_overview(State(state): State<Arc<AppState>>) -> Json<OverviewState> {
    Json(state.controller.overview())
}

/// GET /api/market-metrics - 500 with the fallback payload when upstream fails
async fn get_market_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.controller.overview_service().market_metrics().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

/// GET /stats
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let controller = &state.controller;
    Json(serde_json::json!({
        "active_tab": controller.active_tab(),
        "polling": controller.polling(),
        "fetches": controller.stats().snapshot(),
    }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(get_stats))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/categories/:category", get(get_category))
        .route("/api/tabs/:tab", post(select_tab))
        .route("/api/page/:page", post(request_page))
        .route("/api/overview", get(get_overview))
        .route("/api/market-metrics", get(get_market_metrics))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
