//! Copy-on-publish holder for the latest snapshot.
//!
//! Readers clone an `Arc<Snapshot>` under a short read lock and then work on
//! an immutable value; the refresh task is the only writer and swaps in a new
//! `Arc` for every state change.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{MatchRecord, RefreshStatus, Snapshot};

#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore {
            inner: Arc::new(RwLock::new(Arc::new(Snapshot::initializing()))),
        }
    }

    /// Current snapshot handle.
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.inner.read().await)
    }

    async fn publish(&self, next: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(next);
        *self.inner.write().await = Arc::clone(&next);
        next
    }

    /// Mark a cycle as started; matches and error are carried over.
    pub async fn mark_updating(&self) -> Arc<Snapshot> {
        let prev = self.current().await;
        self.publish(Snapshot {
            status: RefreshStatus::Updating,
            ..(*prev).clone()
        })
        .await
    }

    /// Replace the whole snapshot with a fresh result.
    pub async fn publish_success(&self, matches: Vec<MatchRecord>) -> Arc<Snapshot> {
        let total = matches.len();
        debug!("Publishing snapshot with {} matches", total);
        self.publish(Snapshot {
            matches: Arc::new(matches),
            last_updated: Some(Utc::now()),
            status: RefreshStatus::Success,
            error: None,
            total_matches: total,
        })
        .await
    }

    /// Record a failed cycle, keeping the previous matches untouched.
    pub async fn publish_failure(&self, error: String) -> Arc<Snapshot> {
        let prev = self.current().await;
        self.publish(Snapshot {
            status: RefreshStatus::Error,
            error: Some(error),
            ..(*prev).clone()
        })
        .await
    }
}
