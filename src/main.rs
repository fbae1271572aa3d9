use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod error;
mod extract;
mod models;
mod refresh;
mod render;
mod snapshot;

use api::AppState;
use config::{Config, RendererKind};
use extract::{Extractor, Pipeline};
use refresh::{start_refresh_loop, Refresher};
use render::{ChromeRenderer, HttpRenderer, PageRenderer};
use snapshot::SnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let renderer: Arc<dyn PageRenderer> = match config.renderer {
        RendererKind::Chrome => Arc::new(ChromeRenderer::new(
            &config.user_agent,
            config.chrome_sandbox,
            config.render_timeout(),
            Duration::from_secs(config.settle_delay_secs),
            Duration::from_secs(config.selector_wait_secs),
        )),
        RendererKind::Http => Arc::new(HttpRenderer::new(&config.user_agent, config.render_timeout())?),
    };
    info!("Using {} renderer for {}", renderer.name(), config.target_url);

    let extractor = Extractor::new(&config.link_base_url)?;
    let pipeline = Pipeline::new(extractor, config.dedup_with_time, config.live_only);
    if config.live_only {
        info!("Live-only mode: non-live matches are dropped before publishing");
    }

    let refresher = Arc::new(Refresher::new(
        renderer,
        pipeline,
        SnapshotStore::new(),
        &config.target_url,
        config.render_timeout(),
    ));
    start_refresh_loop(Arc::clone(&refresher), config.refresh_interval());

    let app = api::router(AppState::new(refresher));
    let addr = config.socket_addr()?;
    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run API server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
