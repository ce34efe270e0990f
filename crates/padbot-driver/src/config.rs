//! Tunables for [`PadbotDriver`][crate::PadbotDriver].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest poll period the pollers will run at.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Timing and buffering knobs of the mapper.
///
/// The gateway address is not part of this record; it arrives with
/// `initialize` because the host platform owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Period of both the health and the status poller. Values below
    /// [`MIN_POLL_INTERVAL_MS`] are raised to it.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on every gateway HTTP call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How long `shutdown` waits for each poller before aborting it.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    /// Buffered dispatch events per subscriber before the oldest are dropped.
    #[serde(default = "default_dispatch_event_capacity")]
    pub dispatch_event_capacity: usize,
}

fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_shutdown_grace_ms() -> u64 {
    2000
}
fn default_dispatch_event_capacity() -> usize {
    64
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            dispatch_event_capacity: default_dispatch_event_capacity(),
        }
    }
}

impl DriverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Builder-style override of the poll period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Builder-style override of the shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = grace.as_millis() as u64;
        self
    }
}
