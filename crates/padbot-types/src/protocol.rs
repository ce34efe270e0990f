//! JSON configuration blobs handed over by the host platform.
//!
//! | Blob | Shape |
//! |---|---|
//! | protocol common | `{"customizedValues": {"padbotBaseURL": "…"}}` |
//! | protocol | `{"protocolName": "…", "configData": {"padbotBaseURL": "…"}}` |
//! | visitor | `{"protocolName": "…", "configData": {"propertyName": "…"}}` |
//!
//! Every field is optional; a blob that is not valid JSON of the right shape
//! is a configuration error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::PadbotError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolCommonConfig {
    pub customized_values: CustomizedValues,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizedValues {
    #[serde(rename = "padbotBaseURL")]
    pub padbot_base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolConfig {
    pub protocol_name: String,
    pub config_data: ProtocolConfigData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfigData {
    #[serde(rename = "padbotBaseURL")]
    pub padbot_base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorConfig {
    pub protocol_name: String,
    pub config_data: VisitorConfigData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorConfigData {
    pub property_name: String,
}

impl ProtocolCommonConfig {
    pub fn from_json(raw: &[u8]) -> Result<Self, PadbotError> {
        decode("protocol common", raw)
    }

    pub fn base_url(&self) -> &str {
        &self.customized_values.padbot_base_url
    }
}

impl ProtocolConfig {
    pub fn from_json(raw: &[u8]) -> Result<Self, PadbotError> {
        decode("protocol", raw)
    }
}

impl VisitorConfig {
    pub fn from_json(raw: &[u8]) -> Result<Self, PadbotError> {
        decode("visitor", raw)
    }

    pub fn property_name(&self) -> &str {
        &self.config_data.property_name
    }
}

fn decode<T: DeserializeOwned>(what: &str, raw: &[u8]) -> Result<T, PadbotError> {
    serde_json::from_slice(raw)
        .map_err(|e| PadbotError::Config(format!("malformed {what} config: {e}")))
}
