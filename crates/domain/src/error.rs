//! Common error types used across the workspace.
//!
//! Errors come in three layers:
//!
//! - [`RoomCtlError`] — fatal precondition failures that abort a whole request
//!   before any device is contacted;
//! - [`FieldError`] — failures scoped to a single requested field, reported in
//!   a response's error list without affecting sibling work;
//! - [`DriverError`] — opaque vendor errors coming out of a driver.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::id::{DeviceId, RoomId};

/// Top-level error for a room request that could not be processed at all.
#[derive(Debug, thiserror::Error)]
pub enum RoomCtlError {
    /// A requested device does not exist in the room.
    #[error("{0}: device is invalid in this room")]
    InvalidDevice(DeviceId),

    /// A device references a driver that was never registered.
    #[error("{device}: unknown driver {driver:?}")]
    UnknownDriver { device: DeviceId, driver: String },

    /// The room has no devices to act on.
    #[error("room {0} has no devices")]
    EmptyRoom(RoomId),

    /// Input failed domain validation.
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    /// A referenced room does not exist.
    #[error("Not found")]
    NotFound(#[from] NotFoundError),

    /// The request context was cancelled or its deadline passed before any
    /// work could be attempted.
    #[error("request aborted: {0}")]
    Cancelled(#[source] ContextError),

    /// The room configuration store failed.
    #[error("Storage error")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("room id {0:?} must be formatted as Building-Room")]
    MalformedRoomId(String),

    #[error("{0}: device driver must not be empty")]
    EmptyDriver(DeviceId),

    #[error("{0}: device address must not be empty")]
    EmptyAddress(DeviceId),
}

/// A lookup that came back empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Why a request context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Failure of one requested field on one device.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FieldError {
    /// None of the device's capabilities can satisfy the field.
    #[error("can't set this field on this device")]
    NotCapable,

    /// The block is not declared on the device's ports.
    #[error("invalid block")]
    InvalidBlock,

    /// The device handle could not be created.
    #[error("unable to create device: {0}")]
    Create(#[source] DriverError),

    /// The driver call failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The request context ended before the call completed.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Opaque error reported by a device driver.
///
/// Cheap to clone so one failed handle creation can be handed to every
/// caller that was waiting on it.
#[derive(Clone)]
pub struct DriverError(Arc<dyn StdError + Send + Sync>);

impl DriverError {
    /// Wrap any error coming out of a vendor library.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(Arc::new(Message(message.into())))
    }
}

impl From<ContextError> for DriverError {
    fn from(err: ContextError) -> Self {
        Self::new(err)
    }
}

impl fmt::Debug for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DriverError").field(&self.0).finish()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_device_with_device_id() {
        let err = RoomCtlError::InvalidDevice(DeviceId::new("SW1").unwrap());
        assert_eq!(err.to_string(), "SW1: device is invalid in this room");
    }

    #[test]
    fn should_display_field_error_messages() {
        assert_eq!(
            FieldError::NotCapable.to_string(),
            "can't set this field on this device"
        );
        assert_eq!(FieldError::InvalidBlock.to_string(), "invalid block");
    }

    #[test]
    fn should_display_driver_error_message_transparently() {
        let err = FieldError::from(DriverError::msg("projector lamp is cooling"));
        assert_eq!(err.to_string(), "projector lamp is cooling");
    }

    #[test]
    fn should_share_driver_error_between_clones() {
        let err = DriverError::msg("connection refused");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn should_prefix_create_errors() {
        let err = FieldError::Create(DriverError::msg("dial tcp: timeout"));
        assert_eq!(err.to_string(), "unable to create device: dial tcp: timeout");
    }

    #[test]
    fn should_convert_validation_error_into_room_error() {
        let err: RoomCtlError = ValidationError::EmptyDeviceId.into();
        assert!(matches!(err, RoomCtlError::Validation(_)));
    }
}
