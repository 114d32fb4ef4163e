//! Room — an immutable snapshot of the devices installed in one room.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RoomCtlError, ValidationError};
use crate::id::{DeviceId, RoomId};

/// Port kind tagging a volume block.
pub const VOLUME_PORT: &str = "volume";
/// Port kind tagging a mute block.
pub const MUTE_PORT: &str = "mute";

/// Configuration of every device in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub id: RoomId,
    /// Base URL of the instance owning this room, when it is not this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default)]
    pub devices: BTreeMap<DeviceId, DeviceConfig>,
}

/// How to reach one device and what it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub address: String,
    /// Registry key of the driver that speaks to this device.
    pub driver: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortConfig>,
}

/// A named logical sub-channel of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl RoomConfig {
    /// Create a builder for constructing a [`RoomConfig`].
    #[must_use]
    pub fn builder(id: RoomId) -> RoomConfigBuilder {
        RoomConfigBuilder {
            id,
            proxy: None,
            devices: BTreeMap::new(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RoomCtlError::Validation`] when a device has an empty
    /// driver or address.
    pub fn validate(&self) -> Result<(), RoomCtlError> {
        for (id, device) in &self.devices {
            if device.driver.is_empty() {
                return Err(ValidationError::EmptyDriver(id.clone()).into());
            }
            if device.address.is_empty() {
                return Err(ValidationError::EmptyAddress(id.clone()).into());
            }
        }
        Ok(())
    }
}

impl DeviceConfig {
    #[must_use]
    pub fn new(address: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            driver: driver.into(),
            ports: Vec::new(),
        }
    }

    /// Declare a port.
    #[must_use]
    pub fn with_port(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.ports.push(PortConfig {
            name: name.into(),
            kind: kind.into(),
        });
        self
    }

    /// Whether a port with this name and kind is declared.
    #[must_use]
    pub fn has_port(&self, name: &str, kind: &str) -> bool {
        self.ports.iter().any(|p| p.name == name && p.kind == kind)
    }

    /// Names of every declared port of the given kind, in declaration order.
    #[must_use]
    pub fn blocks(&self, kind: &str) -> Vec<String> {
        self.ports
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Whether `block` may be addressed for ports of `kind`.
    ///
    /// The empty block names the device's default channel and is always
    /// accepted.
    #[must_use]
    pub fn accepts_block(&self, block: &str, kind: &str) -> bool {
        block.is_empty() || self.has_port(block, kind)
    }
}

/// Step-by-step builder for [`RoomConfig`].
#[derive(Debug)]
pub struct RoomConfigBuilder {
    id: RoomId,
    proxy: Option<String>,
    devices: BTreeMap<DeviceId, DeviceConfig>,
}

impl RoomConfigBuilder {
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn device(mut self, id: DeviceId, config: DeviceConfig) -> Self {
        self.devices.insert(id, config);
        self
    }

    /// Consume the builder, validate, and return a [`RoomConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RoomCtlError::Validation`] if a device is misconfigured.
    pub fn build(self) -> Result<RoomConfig, RoomCtlError> {
        let room = RoomConfig {
            id: self.id,
            proxy: self.proxy,
            devices: self.devices,
        };
        room.validate()?;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_id() -> RoomId {
        RoomId::new("ITB-1101").unwrap()
    }

    #[test]
    fn should_build_room_with_devices() {
        let room = RoomConfig::builder(room_id())
            .device(
                DeviceId::new("D1").unwrap(),
                DeviceConfig::new("10.0.0.10", "virtual-display"),
            )
            .build()
            .unwrap();

        assert_eq!(room.devices.len(), 1);
        assert!(room.proxy.is_none());
    }

    #[test]
    fn should_reject_device_without_driver() {
        let result = RoomConfig::builder(room_id())
            .device(DeviceId::new("D1").unwrap(), DeviceConfig::new("10.0.0.10", ""))
            .build();

        assert!(matches!(
            result,
            Err(RoomCtlError::Validation(ValidationError::EmptyDriver(_)))
        ));
    }

    #[test]
    fn should_reject_device_without_address() {
        let result = RoomConfig::builder(room_id())
            .device(DeviceId::new("D1").unwrap(), DeviceConfig::new("", "virtual-dsp"))
            .build();

        assert!(matches!(
            result,
            Err(RoomCtlError::Validation(ValidationError::EmptyAddress(_)))
        ));
    }

    #[test]
    fn should_list_blocks_of_one_kind() {
        let device = DeviceConfig::new("10.0.0.20", "virtual-dsp")
            .with_port("mic1", VOLUME_PORT)
            .with_port("mic1", MUTE_PORT)
            .with_port("program", VOLUME_PORT);

        assert_eq!(device.blocks(VOLUME_PORT), vec!["mic1", "program"]);
        assert_eq!(device.blocks(MUTE_PORT), vec!["mic1"]);
    }

    #[test]
    fn should_accept_default_block_and_declared_blocks_only() {
        let device = DeviceConfig::new("10.0.0.20", "virtual-dsp").with_port("headphones", VOLUME_PORT);

        assert!(device.accepts_block("", VOLUME_PORT));
        assert!(device.accepts_block("headphones", VOLUME_PORT));
        assert!(!device.accepts_block("headphones", MUTE_PORT));
        assert!(!device.accepts_block("invalid", VOLUME_PORT));
    }

    #[test]
    fn should_deserialize_port_type_key() {
        let json = r#"{"address":"10.0.0.20","driver":"virtual-dsp","ports":[{"name":"headphones","type":"volume"}]}"#;
        let device: DeviceConfig = serde_json::from_str(json).unwrap();
        assert!(device.has_port("headphones", VOLUME_PORT));
    }
}
