//! [`Dispatcher`] – fire-and-forget navigation commands.
//!
//! Every accepted `robotLocation` write becomes one detached task that posts
//! to `/navigation`. The caller has already returned by the time the robot
//! answers; the outcome is logged and published on [`DispatchEvents`], and
//! never retried. Commands are not bounded or coalesced, so a burst of
//! writes becomes a burst of concurrent requests.

use std::sync::Arc;

use padbot_types::{DispatchEvent, DispatchOutcome};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::events::DispatchEvents;
use crate::gateway::{Gateway, GatewayError};

#[derive(Clone)]
pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    events: DispatchEvents,
    runtime: Handle,
}

impl Dispatcher {
    /// Commands are spawned onto `runtime`, so [`dispatch`][Self::dispatch]
    /// can be called from threads outside the runtime.
    pub fn new(gateway: Arc<dyn Gateway>, events: DispatchEvents, runtime: Handle) -> Self {
        Self {
            gateway,
            events,
            runtime,
        }
    }

    /// Send the robot to `target_point` in the background.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn dispatch(&self, target_point: impl Into<String>) -> JoinHandle<DispatchOutcome> {
        let target_point = target_point.into();
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let outcome = navigate(gateway.as_ref(), &target_point).await;
            events.publish(DispatchEvent::new(target_point, outcome.clone()));
            outcome
        })
    }
}

async fn navigate(gateway: &dyn Gateway, target_point: &str) -> DispatchOutcome {
    if !gateway.is_configured() {
        warn!(target_point, "navigation dropped; gateway base URL not configured");
        return DispatchOutcome::Failed {
            reason: "gateway base URL not configured".to_string(),
        };
    }
    match gateway.navigate(target_point).await {
        Ok(()) => {
            info!(target_point, "navigation command delivered");
            DispatchOutcome::Delivered
        }
        Err(GatewayError::UnexpectedStatus(status)) => {
            error!(target_point, status, "navigation command rejected");
            DispatchOutcome::Rejected { status }
        }
        Err(e) => {
            error!(target_point, error = %e, "navigation command failed");
            DispatchOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
