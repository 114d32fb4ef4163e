//! In-memory mock devices and drivers shared by the unit tests of this crate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use roomctl_domain::error::DriverError;
use roomctl_domain::response::{DeviceHealth, DeviceInfo};

use crate::context::RequestContext;
use crate::ports::{
    AudioInput, AudioVideoInput, Blank, Capability, DeviceHandle, Driver, Health, Info, Mute,
    Power, VideoInput, Volume,
};

/// Current state of a [`MockDevice`].
#[derive(Debug, Default)]
pub struct MockState {
    pub power: bool,
    pub blanked: bool,
    pub audio_video_inputs: BTreeMap<String, String>,
    pub audio_inputs: BTreeMap<String, String>,
    pub video_inputs: BTreeMap<String, String>,
    pub volumes: BTreeMap<String, i32>,
    pub mutes: BTreeMap<String, bool>,
}

#[derive(Debug, Default)]
struct Behaviour {
    delay: Option<Duration>,
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
}

/// A device implementing every contract, with failure and latency injection
/// and a journal of the calls it received.
#[derive(Debug, Default)]
pub struct MockDevice {
    state: Mutex<MockState>,
    behaviour: Mutex<Behaviour>,
    journal: Mutex<Vec<String>>,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Every call made so far; `<op>` on entry, `<op>/done` on success.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn set_delay(&self, delay: Duration) {
        self.behaviour.lock().unwrap().delay = Some(delay);
    }

    /// Make `op` return an error.
    pub fn fail(&self, op: &'static str) {
        self.behaviour.lock().unwrap().failing.insert(op);
    }

    /// Make `op` never return, ignoring the request context.
    pub fn hang(&self, op: &'static str) {
        self.behaviour.lock().unwrap().hanging.insert(op);
    }

    /// Build a handle exposing only `capabilities`.
    pub fn handle(self: &Arc<Self>, capabilities: &[Capability]) -> DeviceHandle {
        let mut builder = DeviceHandle::builder();
        for capability in capabilities {
            let device = Arc::clone(self);
            builder = match capability {
                Capability::Power => builder.power(device),
                Capability::AudioVideoInput => builder.audio_video_input(device),
                Capability::AudioInput => builder.audio_input(device),
                Capability::VideoInput => builder.video_input(device),
                Capability::Blank => builder.blank(device),
                Capability::Volume => builder.volume(device),
                Capability::Mute => builder.mute(device),
                Capability::Health => builder.health(device),
                Capability::Info => builder.info(device),
            };
        }
        builder.build()
    }

    async fn enter(&self, op: &'static str) -> Result<(), DriverError> {
        self.journal.lock().unwrap().push(op.to_string());
        let (delay, failing, hanging) = {
            let behaviour = self.behaviour.lock().unwrap();
            (
                behaviour.delay,
                behaviour.failing.contains(op),
                behaviour.hanging.contains(op),
            )
        };
        if hanging {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(DriverError::msg(format!("{op} failed")));
        }
        Ok(())
    }

    fn leave(&self, op: &'static str) {
        self.journal.lock().unwrap().push(format!("{op}/done"));
    }
}

pub const ALL_CAPABILITIES: [Capability; 9] = [
    Capability::Power,
    Capability::AudioVideoInput,
    Capability::AudioInput,
    Capability::VideoInput,
    Capability::Blank,
    Capability::Volume,
    Capability::Mute,
    Capability::Health,
    Capability::Info,
];

#[async_trait]
impl Power for MockDevice {
    async fn get_power(&self, _ctx: &RequestContext) -> Result<bool, DriverError> {
        self.enter("get_power").await?;
        Ok(self.state().power)
    }

    async fn set_power(&self, _ctx: &RequestContext, on: bool) -> Result<(), DriverError> {
        self.enter("set_power").await?;
        self.state().power = on;
        self.leave("set_power");
        Ok(())
    }
}

#[async_trait]
impl AudioVideoInput for MockDevice {
    async fn get_audio_video_inputs(
        &self,
        _ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.enter("get_audio_video_inputs").await?;
        Ok(self.state().audio_video_inputs.clone())
    }

    async fn set_audio_video_input(
        &self,
        _ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.enter("set_audio_video_input").await?;
        self.state()
            .audio_video_inputs
            .insert(output.to_string(), input.to_string());
        self.leave("set_audio_video_input");
        Ok(())
    }
}

#[async_trait]
impl AudioInput for MockDevice {
    async fn get_audio_inputs(
        &self,
        _ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.enter("get_audio_inputs").await?;
        Ok(self.state().audio_inputs.clone())
    }

    async fn set_audio_input(
        &self,
        _ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.enter("set_audio_input").await?;
        self.state()
            .audio_inputs
            .insert(output.to_string(), input.to_string());
        self.leave("set_audio_input");
        Ok(())
    }
}

#[async_trait]
impl VideoInput for MockDevice {
    async fn get_video_inputs(
        &self,
        _ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.enter("get_video_inputs").await?;
        Ok(self.state().video_inputs.clone())
    }

    async fn set_video_input(
        &self,
        _ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.enter("set_video_input").await?;
        self.state()
            .video_inputs
            .insert(output.to_string(), input.to_string());
        self.leave("set_video_input");
        Ok(())
    }
}

#[async_trait]
impl Blank for MockDevice {
    async fn get_blank(&self, _ctx: &RequestContext) -> Result<bool, DriverError> {
        self.enter("get_blank").await?;
        Ok(self.state().blanked)
    }

    async fn set_blank(&self, _ctx: &RequestContext, blanked: bool) -> Result<(), DriverError> {
        self.enter("set_blank").await?;
        self.state().blanked = blanked;
        self.leave("set_blank");
        Ok(())
    }
}

#[async_trait]
impl Volume for MockDevice {
    async fn get_volumes(
        &self,
        _ctx: &RequestContext,
        _blocks: &[String],
    ) -> Result<BTreeMap<String, i32>, DriverError> {
        self.enter("get_volumes").await?;
        Ok(self.state().volumes.clone())
    }

    async fn set_volume(
        &self,
        _ctx: &RequestContext,
        block: &str,
        level: i32,
    ) -> Result<(), DriverError> {
        self.enter("set_volume").await?;
        self.state().volumes.insert(block.to_string(), level);
        self.leave("set_volume");
        Ok(())
    }
}

#[async_trait]
impl Mute for MockDevice {
    async fn get_mutes(
        &self,
        _ctx: &RequestContext,
        _blocks: &[String],
    ) -> Result<BTreeMap<String, bool>, DriverError> {
        self.enter("get_mutes").await?;
        Ok(self.state().mutes.clone())
    }

    async fn set_mute(
        &self,
        _ctx: &RequestContext,
        block: &str,
        muted: bool,
    ) -> Result<(), DriverError> {
        self.enter("set_mute").await?;
        self.state().mutes.insert(block.to_string(), muted);
        self.leave("set_mute");
        Ok(())
    }
}

#[async_trait]
impl Health for MockDevice {
    async fn healthy(&self, _ctx: &RequestContext) -> Result<DeviceHealth, DriverError> {
        self.enter("healthy").await?;
        Ok(DeviceHealth::healthy())
    }
}

#[async_trait]
impl Info for MockDevice {
    async fn info(&self, _ctx: &RequestContext) -> Result<DeviceInfo, DriverError> {
        self.enter("info").await?;
        Ok(serde_json::json!({"model": "mock"}))
    }
}

/// Shared count of `create_device` calls per address.
#[derive(Debug, Clone, Default)]
pub struct Creations(Arc<Mutex<HashMap<String, usize>>>);

impl Creations {
    pub fn count(&self, address: &str) -> usize {
        self.0.lock().unwrap().get(address).copied().unwrap_or(0)
    }

    fn record(&self, address: &str) {
        *self
            .0
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default() += 1;
    }
}

/// A driver handing out [`MockDevice`]s.
///
/// Addresses registered with [`with_device`](Self::with_device) get that
/// device with the given capabilities; any other address gets a fresh device
/// with every capability.
#[derive(Default)]
pub struct MockDriver {
    devices: HashMap<String, (Arc<MockDevice>, Vec<Capability>)>,
    failing: HashSet<String>,
    panicking: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
    creations: Creations,
}

impl MockDriver {
    pub fn with_device(
        mut self,
        address: &str,
        device: &Arc<MockDevice>,
        capabilities: &[Capability],
    ) -> Self {
        self.devices.insert(
            address.to_string(),
            (Arc::clone(device), capabilities.to_vec()),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// Panic on the first `create_device` call for `address`.
    pub fn panicking_once(self, address: &str) -> Self {
        self.panicking.lock().unwrap().insert(address.to_string());
        self
    }

    pub fn creations(&self) -> Creations {
        self.creations.clone()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn create_device(
        &self,
        _ctx: &RequestContext,
        address: &str,
    ) -> Result<DeviceHandle, DriverError> {
        self.creations.record(address);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panicking.lock().unwrap().remove(address) {
            panic!("driver blew up opening {address}");
        }
        if self.failing.contains(address) {
            return Err(DriverError::msg(format!("dial {address}: connection refused")));
        }
        Ok(match self.devices.get(address) {
            Some((device, capabilities)) => device.handle(capabilities),
            None => MockDevice::new().handle(&ALL_CAPABILITIES),
        })
    }

    fn parse_config(&self, config: &serde_json::Value) -> Result<(), DriverError> {
        if config.is_object() {
            Ok(())
        } else {
            Err(DriverError::msg("config must be a table"))
        }
    }
}
