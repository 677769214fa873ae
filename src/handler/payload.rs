// Payload Model - data contracts between the network server and applications
// Pure data: uplink payloads, downlink payloads, and lifecycle notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// DEVICE IDENTIFIERS
// ============================================================================

/// Error returned when a hex device identifier cannot be parsed
#[derive(Debug, Clone, Error)]
#[error("invalid {expected}-byte hex identifier: {value}")]
pub struct ParseIdError {
    expected: usize,
    value: String,
}

/// 64-bit device EUI, rendered as a 16-character hex string on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevEui([u8; 8]);

impl DevEui {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for DevEui {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseIdError {
            expected: 8,
            value: s.to_string(),
        })?;
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| ParseIdError {
            expected: 8,
            value: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for DevEui {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DevEui {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-bit device address assigned at join, hex string on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevAddr([u8; 4]);

impl DevAddr {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for DevAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for DevAddr {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseIdError {
            expected: 4,
            value: s.to_string(),
        })?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| ParseIdError {
            expected: 4,
            value: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for DevAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DevAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// BASE64 PAYLOAD BYTES
// ============================================================================

/// Raw frame payload bytes travel as standard base64 text
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// RECEIVE METADATA
// ============================================================================

/// Per-gateway receive metadata attached to an uplink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RxInfo {
    /// MAC of the receiving gateway
    pub mac: String,
    /// Time of reception at the gateway
    pub time: DateTime<Utc>,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// LoRa signal-to-noise ratio in dB
    pub lora_snr: f64,
}

// ============================================================================
// UPLINK PAYLOAD
// ============================================================================

/// An uplink event produced by the server's uplink pipeline,
/// consumed by exactly one send_data_up call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataUpPayload {
    /// Identity of the owning application
    pub application_id: String,
    /// Identity of the sending device
    pub device_eui: DevEui,
    /// Uplink frame counter
    pub f_cnt: u32,
    /// Application port the frame arrived on
    pub f_port: u8,
    /// Decrypted frame payload
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Metadata from every gateway that received the frame
    pub rx_info: Vec<RxInfo>,
}

impl DataUpPayload {
    pub fn new(
        application_id: &str,
        device_eui: DevEui,
        f_cnt: u32,
        f_port: u8,
        data: Vec<u8>,
    ) -> Self {
        Self {
            application_id: application_id.to_string(),
            device_eui,
            f_cnt,
            f_port,
            data,
            rx_info: Vec::new(),
        }
    }

    /// Attach gateway receive metadata
    pub fn with_rx_info(mut self, rx_info: Vec<RxInfo>) -> Self {
        self.rx_info = rx_info;
        self
    }
}

// ============================================================================
// DOWNLINK PAYLOAD
// ============================================================================

/// A downlink request pushed in by the external application;
/// ownership transfers to the server when placed on the intake channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDownPayload {
    /// Identity of the target device
    pub device_eui: DevEui,
    /// Whether the device must confirm reception
    pub confirmed: bool,
    /// Application port to send the frame on
    pub f_port: u8,
    /// Frame payload to transmit
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl DataDownPayload {
    pub fn new(device_eui: DevEui, confirmed: bool, f_port: u8, data: Vec<u8>) -> Self {
        Self {
            device_eui,
            confirmed,
            f_port,
            data,
        }
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

/// Device-joined lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNotification {
    pub application_id: String,
    pub device_eui: DevEui,
    /// Address assigned to the device for this session
    pub dev_addr: DevAddr,
    pub time: DateTime<Utc>,
}

/// Confirmation that a downlink frame was acknowledged by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckNotification {
    pub device_eui: DevEui,
    /// Frame counter of the acknowledged downlink
    pub f_cnt: u32,
}

/// Failure event surfaced to the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNotification {
    pub device_eui: DevEui,
    /// Operation that produced the failure (e.g. "data-up", "otaa")
    pub operation: String,
    /// Free-form error description
    pub error: String,
}
