//! Broadcast channel carrying the outcome of every navigation command.
//!
//! A property write returns as soon as the command is handed off, so the
//! caller never learns whether the robot accepted it. Anything that does
//! care (a console, a metrics exporter, a test) subscribes here instead.
//!
//! Built on [`tokio::sync::broadcast`]: every subscriber receives every
//! event, and a slow subscriber only loses its own oldest events.

use padbot_types::DispatchEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default channel capacity (events buffered per subscriber).
const DEFAULT_CAPACITY: usize = 64;

/// Cheaply clonable handle; all clones share one channel.
#[derive(Clone, Debug)]
pub struct DispatchEvents {
    sender: broadcast::Sender<DispatchEvent>,
}

impl DispatchEvents {
    /// Create a channel buffering `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish `event` and return how many subscribers received it.
    ///
    /// Having no subscribers is the normal case and yields `0`.
    pub fn publish(&self, event: DispatchEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                debug!(target_point = %event.target, "dispatch event dropped; no subscribers");
                0
            }
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }
}

impl Default for DispatchEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
