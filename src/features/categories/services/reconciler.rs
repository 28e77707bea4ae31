//! Turns completed drag gestures into persisted orderings.
//!
//! A gesture is applied to the working tree immediately, then queued for a
//! single background worker that submits reorders one at a time. Each
//! submission is the gesture rebased onto the last confirmed tree and carries
//! that tree's version, so the server can reject writes made against an
//! outdated tree. Stale writes are retried against a freshly fetched tree;
//! any other failure rolls the gesture back.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Duration;

use crate::core::config::ReorderConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, DragMove};
use crate::features::categories::services::mutation_gateway::MutationGateway;
use crate::features::categories::services::notifier::{Notification, Notifier};
use crate::features::categories::services::tree_store::{GestureId, SharedTreeStore};

/// How a drag gesture ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Item dropped on itself; nothing was sent
    Unchanged,
    /// Server accepted the new order
    Persisted,
    /// Server refused; the working tree no longer contains the gesture
    RolledBack { reason: String },
}

struct QueuedGesture {
    id: GestureId,
    reply: oneshot::Sender<ReorderOutcome>,
}

/// Gesture applied locally and waiting for the server
pub struct PendingReorder {
    rx: Option<oneshot::Receiver<ReorderOutcome>>,
}

impl PendingReorder {
    pub async fn outcome(self) -> Result<ReorderOutcome> {
        match self.rx {
            None => Ok(ReorderOutcome::Unchanged),
            Some(rx) => rx
                .await
                .map_err(|_| AppError::Internal("Reorder worker stopped".to_string())),
        }
    }
}

pub struct Reconciler {
    store: SharedTreeStore,
    gateway: Arc<MutationGateway>,
    notifier: Arc<dyn Notifier>,
    queue: mpsc::UnboundedSender<QueuedGesture>,
}

impl Reconciler {
    /// Create the reconciler and spawn its submission worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        gateway: Arc<MutationGateway>,
        notifier: Arc<dyn Notifier>,
        config: ReorderConfig,
    ) -> Self {
        let store = gateway.store().clone();
        let (queue, rx) = mpsc::unbounded_channel();

        let worker = ReorderWorker {
            store: store.clone(),
            gateway: Arc::clone(&gateway),
            notifier: Arc::clone(&notifier),
            max_retries: config.max_retries,
        };
        tokio::spawn(worker.run(rx));

        Self {
            store,
            gateway,
            notifier,
            queue,
        }
    }

    /// Load the tree if it is missing or was invalidated by a mutation
    pub async fn refresh(&self) -> Result<()> {
        self.gateway.ensure_fresh().await
    }

    /// Tree to render right now (optimistic)
    pub async fn snapshot(&self) -> Vec<Category> {
        self.store.read().await.current_snapshot().to_vec()
    }

    /// Apply a finished drag locally and queue it for submission.
    ///
    /// The working tree already reflects the move when this returns.
    pub async fn submit_drag(&self, movement: DragMove) -> Result<PendingReorder> {
        let (reply, rx) = oneshot::channel();

        let mut store = self.store.write().await;
        let id = match store.apply_gesture(movement) {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(PendingReorder { rx: None }),
            Err(e) => {
                tracing::debug!("Rejected drag {:?}: {}", movement, e);
                self.notifier.notify(Notification::failure(e.user_message()));
                return Err(e);
            }
        };

        // Enqueue while holding the store lock so queue order matches gesture order
        if self.queue.send(QueuedGesture { id, reply }).is_err() {
            store.reject(id);
            return Err(AppError::Internal("Reorder worker stopped".to_string()));
        }

        Ok(PendingReorder { rx: Some(rx) })
    }

    /// Apply a finished drag and wait until the server accepted or refused it
    pub async fn on_drag_end(&self, movement: DragMove) -> Result<ReorderOutcome> {
        self.submit_drag(movement).await?.outcome().await
    }
}

/// Exponential backoff: 10ms, 20ms, 40ms, ... capped at 640ms
fn retry_delay(attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    Duration::from_millis(BASE_BACKOFF_MS << exponent)
}

const BASE_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_EXPONENT: usize = 6;

struct ReorderWorker {
    store: SharedTreeStore,
    gateway: Arc<MutationGateway>,
    notifier: Arc<dyn Notifier>,
    max_retries: usize,
}

impl ReorderWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<QueuedGesture>) {
        while let Some(job) = rx.recv().await {
            let outcome = self.submit(job.id).await;
            let _ = job.reply.send(outcome);
        }
        tracing::debug!("Reorder worker stopped");
    }

    async fn submit(&self, id: GestureId) -> ReorderOutcome {
        let mut attempt = 0;

        loop {
            let submission = self.store.read().await.submission_for(id);
            let (tree, version) = match submission {
                Ok(submission) => submission,
                Err(e) => return self.roll_back(id, e).await,
            };

            match self.gateway.reorder(tree.clone(), version).await {
                Ok(new_version) => {
                    self.store.write().await.confirm(id, tree, new_version);
                    if attempt > 0 {
                        tracing::debug!(
                            "Reorder succeeded after {} retry(ies) for gesture {}",
                            attempt,
                            id
                        );
                    }
                    self.notifier
                        .notify(Notification::success("Category order saved"));
                    return ReorderOutcome::Persisted;
                }
                Err(AppError::StaleVersion(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Stale category tree for gesture {} (attempt {}): {}",
                        id,
                        attempt,
                        msg
                    );

                    tokio::time::sleep(retry_delay(attempt)).await;

                    match self.gateway.fetch_tree().await {
                        Ok(snapshot) => self.store.write().await.rebase(snapshot),
                        Err(e) => return self.roll_back(id, e).await,
                    }
                }
                Err(e) => return self.roll_back(id, e).await,
            }
        }
    }

    async fn roll_back(&self, id: GestureId, error: AppError) -> ReorderOutcome {
        tracing::warn!("Rolling back gesture {}: {}", id, error);
        self.store.write().await.reject(id);
        self.notifier
            .notify(Notification::failure(error.user_message()));
        ReorderOutcome::RolledBack {
            reason: error.to_string(),
        }
    }
}
