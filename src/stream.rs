//! Bridge between the chat/streaming provider's `chartCommands` event and
//! the pipeline. Subscribes on attach, forwards batches, isolates failures,
//! and detaches deterministically on teardown.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::CHART_COMMANDS;
use crate::intent::ChartCommandBatch;
use crate::pipeline::ChartPipeline;

/// Push-based provider side of the `chartCommands` event. The hosting
/// session publishes batches as the agent produces them; adapters
/// subscribe.
#[derive(Debug)]
pub struct CommandFeed {
    tx: broadcast::Sender<ChartCommandBatch>,
}

impl CommandFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one batch. Fire-and-forget: a batch with no subscribers is
    /// simply dropped.
    pub fn publish(&self, batch: ChartCommandBatch) {
        let _ = self.tx.send(batch);
    }

    fn subscribe(&self) -> broadcast::Receiver<ChartCommandBatch> {
        self.tx.subscribe()
    }
}

impl Default for CommandFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Scoped subscription to a [`CommandFeed`]. Holds exactly the listener it
/// registered; dropping (or [`CommandStreamAdapter::detach`]) removes it,
/// guaranteeing no handler outlives the session.
pub struct CommandStreamAdapter {
    listener: Option<JoinHandle<()>>,
}

impl CommandStreamAdapter {
    /// Subscribe to the feed and start forwarding batches to the pipeline.
    ///
    /// Batches deliberately run un-serialized: each one is processed on its
    /// own task, so a batch arriving while a previous one is still in
    /// flight interleaves with it, last write wins. Order is only
    /// guaranteed within a single batch.
    pub fn attach(pipeline: Arc<ChartPipeline>, feed: &CommandFeed) -> Self {
        let mut rx = feed.subscribe();
        let listener = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(batch) => {
                        if batch.is_empty() {
                            continue;
                        }
                        info!(
                            event = CHART_COMMANDS,
                            legacy = batch.legacy.len(),
                            structured = batch.structured.len(),
                            "command batch received"
                        );
                        let pipeline = Arc::clone(&pipeline);
                        tokio::spawn(async move {
                            process_batch(&pipeline, &batch);
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "command feed lagged, batches dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Self {
            listener: Some(listener),
        }
    }

    /// Stop listening. Batches already handed to their own task still run
    /// to completion; only the subscription itself is removed.
    pub fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

impl Drop for CommandStreamAdapter {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Apply one batch and log the result. Failed commands are logged and
/// swallowed — a bad batch must never take down the provider's stream or
/// the hosting session.
fn process_batch(pipeline: &ChartPipeline, batch: &ChartCommandBatch) {
    let outcomes =
        pipeline.process_enhanced_response(&batch.response_text, &batch.legacy, &batch.structured);
    for outcome in &outcomes {
        if !outcome.success {
            warn!(message = %outcome.message, "chart command failed");
        }
    }
    debug!(applied = outcomes.len(), "command batch processed");
}
