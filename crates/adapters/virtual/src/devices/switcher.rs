//! Virtual switcher — a 4x4 matrix with independent audio and video breakaway.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use roomctl_app::context::RequestContext;
use roomctl_app::ports::{AudioInput, Health, Info, VideoInput};
use roomctl_domain::error::DriverError;
use roomctl_domain::response::{DeviceHealth, DeviceInfo};

use super::{Link, lock};

const PORTS: [&str; 4] = ["1", "2", "3", "4"];

/// Which input feeds each output, for one signal.
#[derive(Debug)]
struct Matrix(BTreeMap<String, String>);

impl Default for Matrix {
    fn default() -> Self {
        Self(
            PORTS
                .iter()
                .map(|port| ((*port).to_string(), (*port).to_string()))
                .collect(),
        )
    }
}

impl Matrix {
    fn route(&mut self, output: &str, input: &str) -> Result<(), DriverError> {
        if !PORTS.contains(&input) {
            return Err(DriverError::msg(format!("unknown input {input:?}")));
        }
        let slot = self
            .0
            .get_mut(output)
            .ok_or_else(|| DriverError::msg(format!("unknown output {output:?}")))?;
        *slot = input.to_string();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SwitcherState {
    audio: Matrix,
    video: Matrix,
}

/// A simulated matrix switcher; each output starts on the input of the same number.
#[derive(Debug)]
pub struct VirtualSwitcher {
    link: Link,
    state: Mutex<SwitcherState>,
}

impl VirtualSwitcher {
    pub fn new(link: Link) -> Self {
        Self {
            link,
            state: Mutex::new(SwitcherState::default()),
        }
    }
}

#[async_trait]
impl AudioInput for VirtualSwitcher {
    async fn get_audio_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(lock(&self.state).audio.0.clone())
    }

    async fn set_audio_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        lock(&self.state).audio.route(output, input)
    }
}

#[async_trait]
impl VideoInput for VirtualSwitcher {
    async fn get_video_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(lock(&self.state).video.0.clone())
    }

    async fn set_video_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        lock(&self.state).video.route(output, input)
    }
}

#[async_trait]
impl Health for VirtualSwitcher {
    async fn healthy(&self, ctx: &RequestContext) -> Result<DeviceHealth, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(DeviceHealth::healthy())
    }
}

#[async_trait]
impl Info for VirtualSwitcher {
    async fn info(&self, ctx: &RequestContext) -> Result<DeviceInfo, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(serde_json::json!({
            "model": "VS-44",
            "address": self.link.address(),
            "inputs": PORTS,
            "outputs": PORTS,
        }))
    }
}
