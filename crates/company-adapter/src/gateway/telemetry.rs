//! Queued telemetry
//!
//! `track` only enqueues. A single worker task drains the queue and
//! hands events to the analytics backend, which here is the `telemetry`
//! tracing target. When the queue is full the new event is dropped and
//! counted; callers never wait and never see an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use company_usecase::port::{Telemetry, TelemetryEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct QueuedTelemetry {
    sender: mpsc::Sender<TelemetryEvent>,
    dropped: Arc<AtomicU64>,
}

/// Receiving half, run it on its own task
#[derive(Debug)]
pub struct TelemetryWorker {
    receiver: mpsc::Receiver<TelemetryEvent>,
}

impl QueuedTelemetry {
    /// Create the queue with room for `capacity` pending events
    pub fn new(capacity: usize) -> (Self, TelemetryWorker) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            TelemetryWorker { receiver },
        )
    }

    /// Events discarded because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Telemetry for QueuedTelemetry {
    fn track(&self, event: TelemetryEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(event = event.name, dropped, "telemetry queue full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(event = event.name, "telemetry worker stopped, event dropped");
            }
        }
    }
}

impl TelemetryWorker {
    /// Drain events until every sender is gone; returns how many were delivered
    pub async fn run(mut self) -> u64 {
        let mut delivered = 0;
        while let Some(event) = self.receiver.recv().await {
            info!(
                target: "telemetry",
                event = event.name,
                actor = event.actor.as_deref().unwrap_or("anonymous"),
                "tracked"
            );
            delivered += 1;
        }
        delivered
    }
}
