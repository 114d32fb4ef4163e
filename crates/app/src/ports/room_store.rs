//! Room store port — resolves a room id into the room's configuration.

use std::future::Future;

use roomctl_domain::error::RoomCtlError;
use roomctl_domain::id::RoomId;
use roomctl_domain::room::RoomConfig;

/// Source of room configurations.
///
/// The engine trusts what this returns; it only re-checks driver
/// registration and the consistency of the request against the room.
pub trait RoomStore: Send + Sync {
    /// Look up one room.
    ///
    /// Returns [`RoomCtlError::NotFound`] when the room does not exist.
    fn room_config(
        &self,
        id: &RoomId,
    ) -> impl Future<Output = Result<RoomConfig, RoomCtlError>> + Send;
}
