//! Client side of the robot's HTTP control surface.
//!
//! | Call | Endpoint | Success |
//! |---|---|---|
//! | [`Gateway::check_health`] | `GET {base}/health` | exactly `200` |
//! | [`Gateway::fetch_status`] | `GET {base}/status` | `200` + decodable [`RobotStatus`] body |
//! | [`Gateway::navigate`] | `POST {base}/navigation` | exactly `200`, body ignored |
//!
//! The pollers and the dispatcher only talk to the robot through the
//! [`Gateway`] trait, so tests can stand in a scripted gateway.

use async_trait::async_trait;
use padbot_types::RobotStatus;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can arise from a single gateway call.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, …).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with something other than `200 OK`.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    /// The `/status` body was not a status record.
    #[error("Malformed status body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three calls the mapper makes against the robot.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Address every endpoint is resolved against. May be empty.
    fn base_url(&self) -> &str;

    /// A gateway with an empty base URL is never contacted.
    fn is_configured(&self) -> bool {
        !self.base_url().is_empty()
    }

    /// Probe `GET /health`.
    async fn check_health(&self) -> Result<(), GatewayError>;

    /// Fetch and decode `GET /status`.
    async fn fetch_status(&self) -> Result<RobotStatus, GatewayError>;

    /// Send the robot to `target_point` via `POST /navigation`.
    async fn navigate(&self, target_point: &str) -> Result<(), GatewayError>;
}

#[derive(Serialize)]
struct NavigationRequest<'a> {
    #[serde(rename = "targetPoint")]
    target_point: &'a str,
}

/// [`Gateway`] backed by a shared `reqwest` connection pool.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url` whose calls give up after
    /// `timeout`. A trailing `/` on the base URL is ignored.
    ///
    /// The robot sits on the local network, so system proxy settings are
    /// not applied.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn expect_ok(status: StatusCode) -> Result<(), GatewayError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(GatewayError::UnexpectedStatus(status.as_u16()))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_health(&self) -> Result<(), GatewayError> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        expect_ok(response.status())
    }

    async fn fetch_status(&self) -> Result<RobotStatus, GatewayError> {
        let response = self.client.get(self.endpoint("/status")).send().await?;
        expect_ok(response.status())?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn navigate(&self, target_point: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.endpoint("/navigation"))
            .json(&NavigationRequest { target_point })
            .send()
            .await?;
        // Dropping the response releases the connection without reading the body.
        expect_ok(response.status())
    }
}
