//! Driver port — factory turning a device address into a [`DeviceHandle`].

use async_trait::async_trait;

use roomctl_domain::error::DriverError;

use super::device::DeviceHandle;
use crate::context::RequestContext;

/// A family of devices speaking the same protocol.
///
/// Implementations live in adapter crates (e.g. `adapter_virtual`) and are
/// registered once at startup in the
/// [`DriverRegistry`](crate::registry::DriverRegistry).
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a session with the device at `address`.
    ///
    /// May dial the network. Callers go through the registry's cache, so
    /// concurrent requests for one address reach this method only once.
    async fn create_device(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<DeviceHandle, DriverError>;

    /// Apply driver-wide configuration read from the daemon's config file.
    ///
    /// The default accepts anything.
    fn parse_config(&self, _config: &serde_json::Value) -> Result<(), DriverError> {
        Ok(())
    }
}
