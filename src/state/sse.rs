use tokio::sync::broadcast;
use tracing::trace;

use crate::dto::sse::ServerEvent;

/// Fan-out of public scoring events to every connected viewer.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Viewers lagging more than `capacity` events behind skip the backlog.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of viewers currently subscribed.
    pub fn viewers(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish `event`; returns how many viewers received it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        match self.sender.send(event) {
            Ok(delivered) => delivered,
            Err(unsent) => {
                trace!(event = ?unsent.0.event, "no viewer connected");
                0
            }
        }
    }
}
