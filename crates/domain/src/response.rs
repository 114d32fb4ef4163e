//! Responses to room requests: per-device results plus a field-level error report.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::state::DeviceState;

/// Per-device results of one room operation.
///
/// Only devices that produced data appear in `devices`; everything that went
/// wrong is listed in `errors`, sorted by `(id, field, error)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse<T> {
    pub devices: BTreeMap<DeviceId, T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DeviceStateError>,
}

/// Achieved state of the devices in a room.
pub type StateResponse = RoomResponse<DeviceState>;
/// Health of the devices in a room.
pub type HealthResponse = RoomResponse<DeviceHealth>;
/// Driver-reported information about the devices in a room.
pub type InfoResponse = RoomResponse<DeviceInfo>;

/// Opaque driver-reported device information (model, firmware, …).
pub type DeviceInfo = serde_json::Value;

/// Health reported by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// One field that could not be read or applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStateError {
    pub id: DeviceId,
    pub field: String,
    /// The value that was being applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    pub error: String,
}

impl<T> Default for RoomResponse<T> {
    fn default() -> Self {
        Self {
            devices: BTreeMap::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> RoomResponse<T> {
    /// Whether any device or field failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Put `errors` in their canonical order.
    pub fn sort_errors(&mut self) {
        self.errors.sort_by(DeviceStateError::canonical_cmp);
    }
}

impl DeviceHealth {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn unhealthy(issues: Vec<String>) -> Self {
        Self {
            healthy: false,
            issues,
        }
    }
}

impl DeviceStateError {
    pub fn new(
        id: DeviceId,
        field: impl Into<String>,
        value: Option<serde_json::Value>,
        error: impl ToString,
    ) -> Self {
        Self {
            id,
            field: field.into(),
            value,
            error: error.to_string(),
        }
    }

    /// Order by `(id, field, error)`; the rendered value breaks remaining ties.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.field.cmp(&other.field))
            .then_with(|| self.error.cmp(&other.error))
            .then_with(|| render(self.value.as_ref()).cmp(&render(other.value.as_ref())))
    }
}

fn render(value: Option<&serde_json::Value>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}
