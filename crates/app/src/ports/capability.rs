//! Capability ports — the narrow contracts a device handle may satisfy.
//!
//! A device satisfies any subset of these. The engine discovers which ones
//! through [`DeviceHandle`](super::DeviceHandle) and never assumes more.
//! Every call receives the request context and should give up once it ends.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use roomctl_domain::error::DriverError;
use roomctl_domain::response::{DeviceHealth, DeviceInfo};

use crate::context::RequestContext;

/// Power on/off.
#[async_trait]
pub trait Power: Send + Sync {
    async fn get_power(&self, ctx: &RequestContext) -> Result<bool, DriverError>;

    async fn set_power(&self, ctx: &RequestContext, on: bool) -> Result<(), DriverError>;
}

/// Routing of combined audio+video signals, keyed by output.
#[async_trait]
pub trait AudioVideoInput: Send + Sync {
    async fn get_audio_video_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError>;

    async fn set_audio_video_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError>;
}

/// Routing of audio-only signals, keyed by output.
#[async_trait]
pub trait AudioInput: Send + Sync {
    async fn get_audio_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError>;

    async fn set_audio_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError>;
}

/// Routing of video-only signals, keyed by output.
#[async_trait]
pub trait VideoInput: Send + Sync {
    async fn get_video_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError>;

    async fn set_video_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError>;
}

/// Picture blanking.
#[async_trait]
pub trait Blank: Send + Sync {
    async fn get_blank(&self, ctx: &RequestContext) -> Result<bool, DriverError>;

    async fn set_blank(&self, ctx: &RequestContext, blanked: bool) -> Result<(), DriverError>;
}

/// Per-block volume.
#[async_trait]
pub trait Volume: Send + Sync {
    /// Read the level of each requested block. `blocks` lists the device's
    /// declared volume ports and may be empty.
    async fn get_volumes(
        &self,
        ctx: &RequestContext,
        blocks: &[String],
    ) -> Result<BTreeMap<String, i32>, DriverError>;

    async fn set_volume(
        &self,
        ctx: &RequestContext,
        block: &str,
        level: i32,
    ) -> Result<(), DriverError>;
}

/// Per-block mute.
#[async_trait]
pub trait Mute: Send + Sync {
    async fn get_mutes(
        &self,
        ctx: &RequestContext,
        blocks: &[String],
    ) -> Result<BTreeMap<String, bool>, DriverError>;

    async fn set_mute(
        &self,
        ctx: &RequestContext,
        block: &str,
        muted: bool,
    ) -> Result<(), DriverError>;
}

/// Device self-diagnosis.
#[async_trait]
pub trait Health: Send + Sync {
    async fn healthy(&self, ctx: &RequestContext) -> Result<DeviceHealth, DriverError>;
}

/// Free-form device information (model, firmware, serial, …).
#[async_trait]
pub trait Info: Send + Sync {
    async fn info(&self, ctx: &RequestContext) -> Result<DeviceInfo, DriverError>;
}

/// Name of each contract, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Power,
    AudioVideoInput,
    AudioInput,
    VideoInput,
    Blank,
    Volume,
    Mute,
    Health,
    Info,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Power => "power",
            Self::AudioVideoInput => "audio_video_input",
            Self::AudioInput => "audio_input",
            Self::VideoInput => "video_input",
            Self::Blank => "blank",
            Self::Volume => "volume",
            Self::Mute => "mute",
            Self::Health => "health",
            Self::Info => "info",
        };
        f.write_str(name)
    }
}
