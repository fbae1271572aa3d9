use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, warn};

use crate::error::{RefreshError, RenderError};
use crate::extract::Pipeline;
use crate::models::{MatchRecord, Snapshot};
use crate::render::PageRenderer;
use crate::snapshot::SnapshotStore;

/// Runs refresh cycles: render the target page, extract, publish.
///
/// Cycles never overlap. A scheduled tick that finds one in flight is
/// skipped; a manual refresh waits for it and then runs its own.
pub struct Refresher {
    renderer: Arc<dyn PageRenderer>,
    pipeline: Arc<Pipeline>,
    store: SnapshotStore,
    target_url: String,
    render_timeout: Duration,
    cycle: Mutex<()>,
}

impl Refresher {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        pipeline: Pipeline,
        store: SnapshotStore,
        target_url: &str,
        render_timeout: Duration,
    ) -> Self {
        Refresher {
            renderer,
            pipeline: Arc::new(pipeline),
            store,
            target_url: target_url.to_string(),
            render_timeout,
            cycle: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one cycle, waiting for any in-flight cycle first.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let _guard = self.cycle.lock().await;
        self.run_cycle().await
    }

    /// Run one cycle unless another is already in flight.
    pub async fn try_refresh(&self) -> Option<Arc<Snapshot>> {
        let _guard = self.cycle.try_lock().ok()?;
        Some(self.run_cycle().await)
    }

    async fn run_cycle(&self) -> Arc<Snapshot> {
        info!("Updating match data...");
        self.store.mark_updating().await;

        match self.scrape().await {
            Ok(matches) => {
                let total = matches.len();
                let snap = self.store.publish_success(matches).await;
                info!("Data updated successfully. Found {} matches.", total);
                snap
            }
            Err(e) => {
                error!("Failed to update data: {}", e);
                self.store.publish_failure(e.to_string()).await
            }
        }
    }

    async fn scrape(&self) -> Result<Vec<MatchRecord>, RefreshError> {
        let page = tokio::time::timeout(self.render_timeout, self.renderer.render(&self.target_url))
            .await
            .map_err(|_| RenderError::Timeout(self.render_timeout))??;

        let pipeline = Arc::clone(&self.pipeline);
        let now = Utc::now();
        task::spawn_blocking(move || pipeline.run(&page, now))
            .await
            .map_err(|e| RefreshError::Extraction(e.to_string()))
    }
}

/// Spawns the fixed-interval refresh loop. The first cycle starts immediately.
pub fn start_refresh_loop(refresher: Arc<Refresher>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Refresh loop started (renderer={}, interval={:?})",
            refresher.renderer.name(),
            interval
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if refresher.try_refresh().await.is_none() {
                warn!("Previous refresh still running, skipping this tick");
            }
        }
    })
}
