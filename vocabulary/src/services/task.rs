//! Background sync task
//!
//! Runs one sync off the caller's task and hands the outcome back through a
//! oneshot channel the presentation layer polls.

use crate::services::fetcher::VocabularySource;
use crate::services::settings::Settings;
use crate::services::sync::{SyncOutcome, Synchronizer};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a spawned sync
pub struct SyncHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl SyncHandle {
    /// Abandon the sync. Nothing is delivered to the receiver afterwards.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Wait for the task to end, cancelled or not
    pub async fn join(self) {
        if let Err(e) = self.join_handle.await {
            tracing::error!("Sync task panicked or was aborted: {}", e);
        }
    }
}

pub struct SyncTask;

impl SyncTask {
    pub fn spawn(
        synchronizer: Synchronizer,
        source: Arc<dyn VocabularySource>,
        settings: Settings,
    ) -> (SyncHandle, oneshot::Receiver<SyncOutcome>) {
        let cancel_token = CancellationToken::new();
        let (sender, receiver) = oneshot::channel();

        let token = cancel_token.clone();
        let join_handle = tokio::spawn(async move {
            tracing::info!("Sync task started");

            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Sync task cancelled");
                    return;
                }
                outcome = synchronizer.sync(source.as_ref(), &settings) => outcome,
            };

            if let Err(outcome) = sender.send(outcome) {
                tracing::info!(
                    "Sync result dropped, no receiver: {}",
                    outcome.message
                );
            }
        });

        (
            SyncHandle {
                cancel_token,
                join_handle,
            },
            receiver,
        )
    }
}
