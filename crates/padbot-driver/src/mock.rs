//! Scripted [`Gateway`] for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use padbot_types::RobotStatus;
use parking_lot::Mutex;

use crate::gateway::{Gateway, GatewayError};

enum StatusReply {
    Record(RobotStatus),
    Code(u16),
    Malformed,
}

pub(crate) struct MockGateway {
    base_url: String,
    health: Mutex<Result<(), u16>>,
    status: Mutex<StatusReply>,
    navigation: Mutex<Result<(), u16>>,
    delay: Mutex<Duration>,
    health_calls: AtomicUsize,
    status_calls: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    completed_navigations: AtomicUsize,
}

impl MockGateway {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            health: Mutex::new(Ok(())),
            status: Mutex::new(StatusReply::Code(503)),
            navigation: Mutex::new(Ok(())),
            delay: Mutex::new(Duration::ZERO),
            health_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
            completed_navigations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_health(&self, reply: Result<(), u16>) {
        *self.health.lock() = reply;
    }

    pub(crate) fn set_status(&self, reply: Result<RobotStatus, u16>) {
        *self.status.lock() = match reply {
            Ok(record) => StatusReply::Record(record),
            Err(code) => StatusReply::Code(code),
        };
    }

    pub(crate) fn set_status_malformed(&self) {
        *self.status.lock() = StatusReply::Malformed;
    }

    pub(crate) fn set_navigation(&self, reply: Result<(), u16>) {
        *self.navigation.lock() = reply;
    }

    /// Every call sleeps this long before answering.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub(crate) fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Targets of every navigation call started so far.
    pub(crate) fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub(crate) fn completed_navigations(&self) -> usize {
        self.completed_navigations.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.health_calls() + self.status_calls() + self.navigations.lock().len()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_health(&self) -> Result<(), GatewayError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let reply = *self.health.lock();
        reply.map_err(GatewayError::UnexpectedStatus)
    }

    async fn fetch_status(&self) -> Result<RobotStatus, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &*self.status.lock() {
            StatusReply::Record(record) => Ok(record.clone()),
            StatusReply::Code(code) => Err(GatewayError::UnexpectedStatus(*code)),
            StatusReply::Malformed => {
                let err = serde_json::from_str::<RobotStatus>("{\"batteryPercentage\":")
                    .expect_err("truncated JSON never parses");
                Err(GatewayError::Decode(err))
            }
        }
    }

    async fn navigate(&self, target_point: &str) -> Result<(), GatewayError> {
        self.navigations.lock().push(target_point.to_string());
        self.pause().await;
        let reply = *self.navigation.lock();
        self.completed_navigations.fetch_add(1, Ordering::SeqCst);
        reply.map_err(GatewayError::UnexpectedStatus)
    }
}
