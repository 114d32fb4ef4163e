//! # roomctl-adapter-virtual
//!
//! Virtual/demo drivers that provide simulated AV devices for testing and
//! demonstration purposes.
//!
//! ## Provided drivers
//!
//! | Driver | Contracts | Behaviour |
//! |--------|-----------|-----------|
//! | `virtual-display` | power, audio-video input, blank, volume, mute, health, info | Ignores everything but power while off |
//! | `virtual-switcher` | audio input, video input, health, info | 4x4 matrix, outputs start on the matching input |
//! | `virtual-dsp` | volume, mute, health, info | Named gain blocks created on first use |
//!
//! Addresses under the reserved `.invalid` domain never connect, which makes
//! handle-creation failures easy to stage.
//!
//! ## Configuration
//!
//! Each driver accepts an optional table with `latency_ms`, the simulated
//! round-trip time of every device call.
//!
//! ## Dependency rule
//!
//! Depends on `roomctl-app` (port traits) and `roomctl-domain` only.

mod devices;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use roomctl_app::context::RequestContext;
use roomctl_app::ports::{DeviceHandle, Driver};
use roomctl_app::registry::{DriverRegistry, RegistryError};
use roomctl_domain::error::DriverError;

use devices::{Link, VirtualDisplay, VirtualDsp, VirtualSwitcher};

pub const DISPLAY: &str = "virtual-display";
pub const SWITCHER: &str = "virtual-switcher";
pub const DSP: &str = "virtual-dsp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Model {
    Display,
    Switcher,
    Dsp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VirtualConfig {
    #[serde(default)]
    latency_ms: u64,
}

/// Driver handing out one kind of virtual device.
#[derive(Debug)]
pub struct VirtualDriver {
    model: Model,
    latency: RwLock<Duration>,
}

impl VirtualDriver {
    fn new(model: Model) -> Self {
        Self {
            model,
            latency: RwLock::new(Duration::ZERO),
        }
    }

    #[must_use]
    pub fn display() -> Self {
        Self::new(Model::Display)
    }

    #[must_use]
    pub fn switcher() -> Self {
        Self::new(Model::Switcher)
    }

    #[must_use]
    pub fn dsp() -> Self {
        Self::new(Model::Dsp)
    }

    /// Registry name of this driver.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.model {
            Model::Display => DISPLAY,
            Model::Switcher => SWITCHER,
            Model::Dsp => DSP,
        }
    }

    fn latency(&self) -> Duration {
        *self.latency.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Driver for VirtualDriver {
    async fn create_device(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<DeviceHandle, DriverError> {
        let link = Link::new(address, self.latency());
        link.round_trip(ctx).await?;
        if address.ends_with(".invalid") {
            return Err(DriverError::msg(format!("dial {address}: no such host")));
        }
        tracing::debug!(driver = self.name(), %address, "virtual device connected");

        let handle = match self.model {
            Model::Display => {
                let device = Arc::new(VirtualDisplay::new(link));
                DeviceHandle::builder()
                    .power(device.clone())
                    .audio_video_input(device.clone())
                    .blank(device.clone())
                    .volume(device.clone())
                    .mute(device.clone())
                    .health(device.clone())
                    .info(device)
                    .build()
            }
            Model::Switcher => {
                let device = Arc::new(VirtualSwitcher::new(link));
                DeviceHandle::builder()
                    .audio_input(device.clone())
                    .video_input(device.clone())
                    .health(device.clone())
                    .info(device)
                    .build()
            }
            Model::Dsp => {
                let device = Arc::new(VirtualDsp::new(link));
                DeviceHandle::builder()
                    .volume(device.clone())
                    .mute(device.clone())
                    .health(device.clone())
                    .info(device)
                    .build()
            }
        };
        Ok(handle)
    }

    fn parse_config(&self, config: &serde_json::Value) -> Result<(), DriverError> {
        let config = VirtualConfig::deserialize(config).map_err(DriverError::new)?;
        *self.latency.write().unwrap_or_else(PoisonError::into_inner) =
            Duration::from_millis(config.latency_ms);
        Ok(())
    }
}

/// Register the display, switcher and DSP drivers under their default names.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if one of the names is already taken.
pub fn register_all(registry: &DriverRegistry) -> Result<(), RegistryError> {
    for driver in [
        VirtualDriver::display(),
        VirtualDriver::switcher(),
        VirtualDriver::dsp(),
    ] {
        registry.register(driver.name(), driver)?;
    }
    Ok(())
}
