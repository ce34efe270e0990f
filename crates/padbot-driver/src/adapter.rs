//! Host-platform surface of the mapper.
//!
//! The device-management host never calls [`PadbotDriver`] directly. It
//! hands over raw JSON blobs (protocol common, visitor, protocol) and
//! expects string data back. [`ProtocolDriver`] is that contract; the
//! implementation for [`PadbotDriver`] decodes the blobs and delegates.

use async_trait::async_trait;
use padbot_types::{PadbotError, ProtocolCommonConfig, ProtocolConfig, VisitorConfig};
use tracing::error;

use crate::driver::PadbotDriver;

/// Name under which the mapper registers with the host.
pub const PROTOCOL_NAME: &str = "padbot-protocol";

/// Every device driver the host can load must implement this trait.
///
/// # Contract
///
/// * Only malformed configuration blobs produce errors. Network trouble is
///   reflected in the data (sentinels) and in [`device_status`].
/// * Reads and writes never wait on the network.
///
/// [`device_status`]: ProtocolDriver::device_status
#[async_trait]
pub trait ProtocolDriver: Send + Sync {
    /// Parse `protocol_common` and start mirroring the device.
    async fn init_device(&self, protocol_common: &[u8]) -> Result<(), PadbotError>;

    /// Read the property named by `visitor`.
    fn read_device_data(
        &self,
        protocol_common: &[u8],
        visitor: &[u8],
        protocol: &[u8],
    ) -> Result<String, PadbotError>;

    /// Write `data` to the property named by `visitor`.
    fn write_device_data(
        &self,
        data: &str,
        protocol_common: &[u8],
        visitor: &[u8],
        protocol: &[u8],
    ) -> Result<(), PadbotError>;

    /// Stop mirroring the device.
    async fn stop_device(&self) -> Result<(), PadbotError>;

    /// `true` when the device answered its last health probe.
    fn device_status(&self) -> bool;
}

/// Decode all three per-call blobs; the visitor config is the one that matters.
fn decode_call(
    operation: &str,
    protocol_common: &[u8],
    visitor: &[u8],
    protocol: &[u8],
) -> Result<VisitorConfig, PadbotError> {
    let decoded = ProtocolCommonConfig::from_json(protocol_common)
        .and_then(|_| ProtocolConfig::from_json(protocol))
        .and_then(|_| VisitorConfig::from_json(visitor));
    decoded.inspect_err(|e| error!(operation, error = %e, "rejecting malformed device config"))
}

#[async_trait]
impl ProtocolDriver for PadbotDriver {
    async fn init_device(&self, protocol_common: &[u8]) -> Result<(), PadbotError> {
        let common = ProtocolCommonConfig::from_json(protocol_common)
            .inspect_err(|e| error!(error = %e, "rejecting malformed init config"))?;
        self.initialize(common.base_url()).await
    }

    fn read_device_data(
        &self,
        protocol_common: &[u8],
        visitor: &[u8],
        protocol: &[u8],
    ) -> Result<String, PadbotError> {
        let visitor = decode_call("read", protocol_common, visitor, protocol)?;
        Ok(self.read_property(visitor.property_name()).into_string())
    }

    fn write_device_data(
        &self,
        data: &str,
        protocol_common: &[u8],
        visitor: &[u8],
        protocol: &[u8],
    ) -> Result<(), PadbotError> {
        let visitor = decode_call("write", protocol_common, visitor, protocol)?;
        self.write_property(visitor.property_name(), data)
    }

    async fn stop_device(&self) -> Result<(), PadbotError> {
        self.shutdown().await
    }

    fn device_status(&self) -> bool {
        self.health()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use std::time::Duration;

    const COMMON_UNSET: &[u8] = br#"{"customizedValues":{"padbotBaseURL":""}}"#;
    const PROTOCOL: &[u8] = br#"{"protocolName":"padbot-protocol","configData":{}}"#;

    fn visitor(property: &str) -> Vec<u8> {
        format!(r#"{{"protocolName":"{PROTOCOL_NAME}","configData":{{"propertyName":"{property}"}}}}"#)
            .into_bytes()
    }

    fn driver() -> PadbotDriver {
        PadbotDriver::new(DriverConfig::default().with_poll_interval(Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn malformed_init_config_does_not_start() {
        let d = driver();
        let err = d.init_device(b"not json").await.unwrap_err();
        assert!(matches!(err, PadbotError::Config(_)));
        assert!(!d.is_running());
    }

    #[tokio::test]
    async fn init_with_unset_base_url_starts_idle() {
        let d = driver();
        d.init_device(COMMON_UNSET).await.unwrap();
        assert!(d.is_running());
        assert!(!d.device_status());
        d.stop_device().await.unwrap();
        assert!(!d.is_running());
    }

    #[test]
    fn read_resolves_visitor_property() {
        let d = driver();
        let v = d
            .read_device_data(COMMON_UNSET, &visitor("batteryPercentage"), PROTOCOL)
            .unwrap();
        assert_eq!(v, "-1");
    }

    #[test]
    fn read_of_unknown_property_is_unknown() {
        let d = driver();
        let v = d.read_device_data(COMMON_UNSET, &visitor("speed"), PROTOCOL).unwrap();
        assert_eq!(v, "UNKNOWN");
    }

    #[test]
    fn read_with_malformed_visitor_fails() {
        let d = driver();
        let err = d.read_device_data(COMMON_UNSET, b"{", PROTOCOL).unwrap_err();
        assert!(matches!(err, PadbotError::Config(msg) if msg.contains("visitor")));
    }

    #[test]
    fn write_with_malformed_protocol_fails() {
        let d = driver();
        let err = d
            .write_device_data("Room42", COMMON_UNSET, &visitor("robotLocation"), b"[")
            .unwrap_err();
        assert!(matches!(err, PadbotError::Config(_)));
    }

    #[test]
    fn write_of_unset_target_is_accepted_without_session() {
        let d = driver();
        assert!(
            d.write_device_data("UNKNOWN", COMMON_UNSET, &visitor("robotLocation"), PROTOCOL)
                .is_ok()
        );
    }
}
