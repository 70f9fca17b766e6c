//! Polling loop for long-running clustering jobs
//!
//! A clustering is created by a user action elsewhere; this module owns the
//! follow-up: refresh its status on a fixed interval, shallow-merge each
//! partial response into the held object, and stop permanently once a
//! terminal status (`completed` or `failed`) is observed.
//!
//! The loop is an explicit task with a cancellation handle, independent of
//! any UI lifecycle: closing the view cancels deterministically, and no
//! timer outlives its [`PollHandle`].

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::types::{Clustering, ClusteringUpdate};

/// Default refresh interval for clustering status.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Spawn a poller that refreshes `initial` every `interval` until it
/// reaches a terminal status.
///
/// `refresh` produces the partial update for one tick, or `None` for a
/// transient failure. A failed tick is swallowed and the loop continues,
/// since the fetch client already reported the failure on its own channel.
/// The first refresh fires one full interval after spawn; the job was just
/// fetched by whoever constructed `initial`.
pub fn spawn_poller<F, Fut>(initial: Clustering, interval: Duration, refresh: F) -> PollHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Option<ClusteringUpdate>> + Send + 'static,
{
    let (updates_tx, updates_rx) = watch::channel(initial.clone());
    let (cancel_tx, mut cancel_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut clustering = initial;
        if clustering.status.is_terminal() {
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; consume it so the
        // first refresh lands one period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            let Some(update) = refresh().await else {
                continue;
            };

            clustering.merge_update(update);
            updates_tx.send_replace(clustering.clone());

            if clustering.status.is_terminal() {
                tracing::debug!(
                    clustering_id = %clustering.id,
                    status = %clustering.status,
                    "clustering reached terminal status, polling stopped"
                );
                break;
            }
        }
    });

    PollHandle {
        updates: updates_rx,
        cancel_tx,
        task,
    }
}

/// Handle to a running clustering poll task.
///
/// Dropping the handle closes the cancellation channel and stops the loop,
/// so a discarded handle never leaves an orphaned timer behind.
pub struct PollHandle {
    updates: watch::Receiver<Clustering>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Latest merged snapshot of the clustering.
    pub fn latest(&self) -> Clustering {
        self.updates.borrow().clone()
    }

    /// Subscribe to merged snapshots as refreshes land.
    pub fn subscribe(&self) -> watch::Receiver<Clustering> {
        self.updates.clone()
    }

    /// Stop polling. Idempotent; polling also stops on its own at a
    /// terminal status.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Whether the poll task has exited (terminal status or cancellation).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
