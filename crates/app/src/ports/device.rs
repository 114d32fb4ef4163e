//! Device handle — the opaque value a driver hands out for one device.
//!
//! Capabilities are resolved once, when the driver builds the handle, into one
//! optional reference per contract. The engine only ever asks the handle
//! which contracts are present; it never inspects the concrete device type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use roomctl_domain::error::FieldError;
use roomctl_domain::field::InputKind;

use super::capability::{
    AudioInput, AudioVideoInput, Blank, Capability, Health, Info, Mute, Power, VideoInput, Volume,
};
use crate::context::RequestContext;

/// A live session with one physical device.
///
/// Cheap to clone; clones share the underlying device.
#[derive(Clone, Default)]
pub struct DeviceHandle {
    power: Option<Arc<dyn Power>>,
    audio_video_input: Option<Arc<dyn AudioVideoInput>>,
    audio_input: Option<Arc<dyn AudioInput>>,
    video_input: Option<Arc<dyn VideoInput>>,
    blank: Option<Arc<dyn Blank>>,
    volume: Option<Arc<dyn Volume>>,
    mute: Option<Arc<dyn Mute>>,
    health: Option<Arc<dyn Health>>,
    info: Option<Arc<dyn Info>>,
}

impl DeviceHandle {
    /// Create a builder for constructing a [`DeviceHandle`].
    #[must_use]
    pub fn builder() -> DeviceHandleBuilder {
        DeviceHandleBuilder::default()
    }

    #[must_use]
    pub fn power(&self) -> Option<&dyn Power> {
        self.power.as_deref()
    }

    #[must_use]
    pub fn blank(&self) -> Option<&dyn Blank> {
        self.blank.as_deref()
    }

    #[must_use]
    pub fn volume(&self) -> Option<&dyn Volume> {
        self.volume.as_deref()
    }

    #[must_use]
    pub fn mute(&self) -> Option<&dyn Mute> {
        self.mute.as_deref()
    }

    #[must_use]
    pub fn health(&self) -> Option<&dyn Health> {
        self.health.as_deref()
    }

    #[must_use]
    pub fn info(&self) -> Option<&dyn Info> {
        self.info.as_deref()
    }

    /// Whether inputs of this kind can be read and routed.
    #[must_use]
    pub fn supports_input(&self, kind: InputKind) -> bool {
        match kind {
            InputKind::AudioVideo => self.audio_video_input.is_some(),
            InputKind::Audio => self.audio_input.is_some(),
            InputKind::Video => self.video_input.is_some(),
        }
    }

    /// Read the input routed to every output for one signal kind.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotCapable`] when the kind is unsupported, otherwise the
    /// driver's error.
    pub async fn get_inputs(
        &self,
        ctx: &RequestContext,
        kind: InputKind,
    ) -> Result<BTreeMap<String, String>, FieldError> {
        let inputs = match kind {
            InputKind::AudioVideo => match &self.audio_video_input {
                Some(c) => c.get_audio_video_inputs(ctx).await?,
                None => return Err(FieldError::NotCapable),
            },
            InputKind::Audio => match &self.audio_input {
                Some(c) => c.get_audio_inputs(ctx).await?,
                None => return Err(FieldError::NotCapable),
            },
            InputKind::Video => match &self.video_input {
                Some(c) => c.get_video_inputs(ctx).await?,
                None => return Err(FieldError::NotCapable),
            },
        };
        Ok(inputs)
    }

    /// Route `input` to `output` for one signal kind.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotCapable`] when the kind is unsupported, otherwise the
    /// driver's error.
    pub async fn set_input(
        &self,
        ctx: &RequestContext,
        kind: InputKind,
        output: &str,
        input: &str,
    ) -> Result<(), FieldError> {
        match kind {
            InputKind::AudioVideo => match &self.audio_video_input {
                Some(c) => c.set_audio_video_input(ctx, output, input).await?,
                None => return Err(FieldError::NotCapable),
            },
            InputKind::Audio => match &self.audio_input {
                Some(c) => c.set_audio_input(ctx, output, input).await?,
                None => return Err(FieldError::NotCapable),
            },
            InputKind::Video => match &self.video_input {
                Some(c) => c.set_video_input(ctx, output, input).await?,
                None => return Err(FieldError::NotCapable),
            },
        }
        Ok(())
    }

    /// Every contract this handle satisfies.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        [
            (self.power.is_some(), Capability::Power),
            (self.audio_video_input.is_some(), Capability::AudioVideoInput),
            (self.audio_input.is_some(), Capability::AudioInput),
            (self.video_input.is_some(), Capability::VideoInput),
            (self.blank.is_some(), Capability::Blank),
            (self.volume.is_some(), Capability::Volume),
            (self.mute.is_some(), Capability::Mute),
            (self.health.is_some(), Capability::Health),
            (self.info.is_some(), Capability::Info),
        ]
        .into_iter()
        .filter_map(|(present, capability)| present.then_some(capability))
        .collect()
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Step-by-step builder for [`DeviceHandle`].
///
/// Pass the same `Arc`-ed device to every contract it implements:
///
/// ```ignore
/// let display = Arc::new(Display::connect(address).await?);
/// let handle = DeviceHandle::builder()
///     .power(display.clone())
///     .blank(display.clone())
///     .volume(display)
///     .build();
/// ```
#[derive(Default)]
pub struct DeviceHandleBuilder {
    handle: DeviceHandle,
}

impl DeviceHandleBuilder {
    #[must_use]
    pub fn power(mut self, device: Arc<dyn Power>) -> Self {
        self.handle.power = Some(device);
        self
    }

    #[must_use]
    pub fn audio_video_input(mut self, device: Arc<dyn AudioVideoInput>) -> Self {
        self.handle.audio_video_input = Some(device);
        self
    }

    #[must_use]
    pub fn audio_input(mut self, device: Arc<dyn AudioInput>) -> Self {
        self.handle.audio_input = Some(device);
        self
    }

    #[must_use]
    pub fn video_input(mut self, device: Arc<dyn VideoInput>) -> Self {
        self.handle.video_input = Some(device);
        self
    }

    #[must_use]
    pub fn blank(mut self, device: Arc<dyn Blank>) -> Self {
        self.handle.blank = Some(device);
        self
    }

    #[must_use]
    pub fn volume(mut self, device: Arc<dyn Volume>) -> Self {
        self.handle.volume = Some(device);
        self
    }

    #[must_use]
    pub fn mute(mut self, device: Arc<dyn Mute>) -> Self {
        self.handle.mute = Some(device);
        self
    }

    #[must_use]
    pub fn health(mut self, device: Arc<dyn Health>) -> Self {
        self.handle.health = Some(device);
        self
    }

    #[must_use]
    pub fn info(mut self, device: Arc<dyn Info>) -> Self {
        self.handle.info = Some(device);
        self
    }

    #[must_use]
    pub fn build(self) -> DeviceHandle {
        self.handle
    }
}
