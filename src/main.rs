mod api;
mod config;
mod models;
mod services;
mod sources;

use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use services::{DashboardController, DashboardSettings};
use sources::fatfinger::FatFingerSource;
use sources::TokenSource;

#[tokio::main(worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,token_board=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Configuration loaded, upstream {}", config.upstream.base_url);

    let source: Arc<dyn TokenSource> = Arc::new(FatFingerSource::new(&config.upstream)?);
    let controller = DashboardController::new(source, DashboardSettings::from_config(&config));

    let mounting = controller.clone();
    tokio::spawn(async move {
        mounting.mount().await;
    });

    let state = Arc::new(AppState {
        controller,
        push_interval: Duration::from_secs(config.server.push_interval_secs),
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server ready on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
