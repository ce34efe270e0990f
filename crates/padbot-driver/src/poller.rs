//! Background loops keeping the [`Snapshot`] fresh.
//!
//! Two pollers run per session, one for `/health` and one for `/status`.
//! Each owns its own stop channel, so stopping one never waits on the other,
//! and signalling a poller that already exited is a no-op. The stop signal
//! is raced against the whole iteration (HTTP call and sleep), so a slow
//! gateway call never delays shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use padbot_types::RobotStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use crate::state::Snapshot;

/// Handle to one running poller task.
pub(crate) struct PollerHandle {
    name: &'static str,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the poller to stop. Never blocks.
    pub(crate) fn signal_stop(&self) {
        // Fails only when the task is already gone, which is what we want anyway.
        let _ = self.stop.send(true);
    }

    /// Wait up to `grace` for the task to exit, aborting it otherwise.
    pub(crate) async fn join(mut self, grace: Duration) {
        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(())) => debug!(poller = self.name, "poller stopped"),
            Ok(Err(e)) => warn!(poller = self.name, error = %e, "poller task ended abnormally"),
            Err(_) => {
                warn!(
                    poller = self.name,
                    grace_ms = grace.as_millis() as u64,
                    "poller did not stop in time; aborting"
                );
                self.task.abort();
            }
        }
    }
}

/// Start the `/health` poller.
pub(crate) fn spawn_health_poller(
    gateway: Arc<dyn Gateway>,
    snapshot: Arc<Snapshot>,
    period: Duration,
) -> PollerHandle {
    spawn_poller("health", period, move || {
        let gateway = Arc::clone(&gateway);
        let snapshot = Arc::clone(&snapshot);
        async move { poll_health(gateway.as_ref(), &snapshot).await }
    })
}

/// Start the `/status` poller.
pub(crate) fn spawn_status_poller(
    gateway: Arc<dyn Gateway>,
    snapshot: Arc<Snapshot>,
    period: Duration,
) -> PollerHandle {
    spawn_poller("status", period, move || {
        let gateway = Arc::clone(&gateway);
        let snapshot = Arc::clone(&snapshot);
        async move { poll_status(gateway.as_ref(), &snapshot).await }
    })
}

/// One health iteration: exactly `200` is healthy, anything else is not.
pub(crate) async fn poll_health(gateway: &dyn Gateway, snapshot: &Snapshot) {
    if !gateway.is_configured() {
        return;
    }
    match gateway.check_health().await {
        Ok(()) => {
            if !snapshot.healthy() {
                info!(base_url = gateway.base_url(), "gateway healthy");
            }
            snapshot.set_healthy(true);
        }
        Err(e) => {
            warn!(base_url = gateway.base_url(), error = %e, "health probe failed");
            snapshot.set_healthy(false);
        }
    }
}

/// One status iteration.
///
/// Starts from an all-sentinel record and publishes whatever it ends up
/// with, so a failed or unparsable probe clears the previous cycle's values.
pub(crate) async fn poll_status(gateway: &dyn Gateway, snapshot: &Snapshot) {
    if !gateway.is_configured() {
        return;
    }
    let status = match gateway.fetch_status().await {
        Ok(status) => status,
        Err(e) => {
            warn!(base_url = gateway.base_url(), error = %e, "status probe failed");
            RobotStatus::unknown()
        }
    };
    snapshot.publish_status(status);
}

fn spawn_poller<F, Fut>(name: &'static str, period: Duration, tick: F) -> PollerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop, stop_rx) = watch::channel(false);
    let task = tokio::spawn(run_loop(name, period, stop_rx, tick));
    PollerHandle { name, stop, task }
}

async fn run_loop<F, Fut>(
    name: &'static str,
    period: Duration,
    mut stop: watch::Receiver<bool>,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    debug!(poller = name, period_ms = period.as_millis() as u64, "poller started");
    loop {
        let stopped = *stop.borrow();
        if stopped {
            break;
        }
        tokio::select! {
            biased;
            // A dropped sender counts as a stop request too.
            _ = stop.changed() => break,
            _ = async {
                tick().await;
                tokio::time::sleep(period).await;
            } => {}
        }
    }
    debug!(poller = name, "poller exiting");
}
