//! [`PadbotDriver`] – lifecycle controller and property adapter.
//!
//! `initialize` starts one session: a gateway rooted at the supplied base
//! URL, the two pollers, and a dispatcher for navigation commands.
//! `shutdown` ends it. Between the two, reads are served from the
//! [`Snapshot`] only and writes return as soon as the command is handed off.
//!
//! # Example
//!
//! ```rust,no_run
//! use padbot_driver::{DriverConfig, PadbotDriver};
//!
//! # async fn run() -> Result<(), padbot_types::PadbotError> {
//! let driver = PadbotDriver::new(DriverConfig::default());
//! driver.initialize("http://192.168.1.20:5000").await?;
//!
//! let battery = driver.read_property("batteryPercentage").into_string();
//! driver.write_property("robotLocation", "Room42")?;
//!
//! driver.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use padbot_types::{
    DispatchEvent, DispatchOutcome, PadbotError, Property, PropertyRead, RobotStatus, UNKNOWN,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::dispatch::Dispatcher;
use crate::events::DispatchEvents;
use crate::gateway::{Gateway, HttpGateway};
use crate::poller::{self, PollerHandle};
use crate::state::Snapshot;

/// Everything that lives between `initialize` and `shutdown`.
struct Session {
    base_url: String,
    dispatcher: Dispatcher,
    health: PollerHandle,
    status: PollerHandle,
}

impl Session {
    async fn stop(self, grace: std::time::Duration) {
        // Signal both first so neither waits behind the other.
        self.health.signal_stop();
        self.status.signal_stop();
        self.health.join(grace).await;
        self.status.join(grace).await;
    }
}

/// Mirror of a single Padbot robot.
pub struct PadbotDriver {
    config: DriverConfig,
    snapshot: Arc<Snapshot>,
    events: DispatchEvents,
    session: Mutex<Option<Session>>,
    /// Held across `initialize` and `shutdown` so sessions never overlap.
    lifecycle: tokio::sync::Mutex<()>,
}

impl PadbotDriver {
    pub fn new(config: DriverConfig) -> Self {
        let events = DispatchEvents::new(config.dispatch_event_capacity);
        Self {
            config,
            snapshot: Arc::new(Snapshot::new()),
            events,
            session: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Start mirroring the robot at `base_url` and return immediately.
    ///
    /// An empty `base_url` is accepted: the pollers run but never touch the
    /// network. Calling this on a running driver stops the previous session
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`PadbotError::Config`] when the HTTP client cannot be built;
    /// no poller is started in that case.
    pub async fn initialize(&self, base_url: &str) -> Result<(), PadbotError> {
        let gateway = HttpGateway::new(base_url, self.config.request_timeout())
            .map_err(|e| PadbotError::Config(format!("cannot build gateway client: {e}")))?;
        self.initialize_with_gateway(Arc::new(gateway)).await;
        Ok(())
    }

    /// Start a session against an already-built [`Gateway`].
    pub async fn initialize_with_gateway(&self, gateway: Arc<dyn Gateway>) {
        let _lifecycle = self.lifecycle.lock().await;
        let previous = self.session.lock().take();
        if let Some(previous) = previous {
            info!(base_url = %previous.base_url, "re-initializing; stopping previous session");
            previous.stop(self.config.shutdown_grace()).await;
        }

        self.snapshot.reset();
        let period = self.config.poll_interval();
        let base_url = gateway.base_url().to_string();
        if base_url.is_empty() {
            warn!("gateway base URL is empty; pollers will idle until reconfigured");
        }

        let session = Session {
            health: poller::spawn_health_poller(Arc::clone(&gateway), Arc::clone(&self.snapshot), period),
            status: poller::spawn_status_poller(Arc::clone(&gateway), Arc::clone(&self.snapshot), period),
            dispatcher: Dispatcher::new(gateway, self.events.clone(), Handle::current()),
            base_url,
        };
        info!(base_url = %session.base_url, period_ms = period.as_millis() as u64, "padbot mapper initialized");

        *self.session.lock() = Some(session);
    }

    /// Stop both pollers, waiting at most the configured grace period for
    /// each. Idempotent.
    pub async fn shutdown(&self) -> Result<(), PadbotError> {
        let _lifecycle = self.lifecycle.lock().await;
        let session = self.session.lock().take();
        match session {
            Some(session) => {
                info!(base_url = %session.base_url, "stopping padbot mapper");
                session.stop(self.config.shutdown_grace()).await;
            }
            None => debug!("shutdown requested while not running"),
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Base URL of the running session.
    pub fn base_url(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.base_url.clone())
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// Cached health flag; never touches the network.
    pub fn health(&self) -> bool {
        self.snapshot.healthy()
    }

    /// The whole cached status record.
    pub fn snapshot(&self) -> Arc<RobotStatus> {
        self.snapshot.status()
    }

    /// Resolve `name` against the cached status record.
    ///
    /// Unknown names yield [`PropertyRead::Unknown`]; an empty cached value
    /// is reported as `"UNKNOWN"`.
    pub fn read_property(&self, name: &str) -> PropertyRead {
        let Ok(property) = name.parse::<Property>() else {
            warn!(property = name, "unknown property requested");
            return PropertyRead::Unknown;
        };
        PropertyRead::Value(self.snapshot.status().value_of(property))
    }

    // ── Writes ──────────────────────────────────────────────────────────────

    /// Apply `value` to `name`.
    ///
    /// Only `robotLocation` is writable; writing it queues a navigation
    /// command and returns before the robot answers. Empty or `"UNKNOWN"`
    /// targets, read-only properties and unknown names are ignored.
    ///
    /// Delivery is never reported here. A command written while no session
    /// is running is dropped and published as [`DispatchOutcome::Failed`].
    pub fn write_property(&self, name: &str, value: &str) -> Result<(), PadbotError> {
        match name.parse::<Property>() {
            Ok(property) if property.is_writable() => {}
            Ok(property) => {
                warn!(property = %property, "property is read-only; write ignored");
                return Ok(());
            }
            Err(_) => {
                warn!(property = name, "unknown property or not writable; write ignored");
                return Ok(());
            }
        }

        if value.is_empty() || value == UNKNOWN {
            debug!(target_point = value, "unset navigation target ignored");
            return Ok(());
        }

        let session = self.session.lock();
        match session.as_ref() {
            Some(session) => {
                session.dispatcher.dispatch(value);
                info!(target_point = value, "navigation command accepted");
            }
            None => {
                warn!(target_point = value, "navigation dropped; mapper not running");
                self.events.publish(DispatchEvent::new(
                    value,
                    DispatchOutcome::Failed {
                        reason: "mapper not running".to_string(),
                    },
                ));
            }
        }
        Ok(())
    }

    /// Outcomes of navigation commands dispatched from now on.
    pub fn subscribe_dispatch(&self) -> broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }
}

impl Default for PadbotDriver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}
