//! Virtual display — one output, four HDMI inputs, built-in speakers.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use roomctl_app::context::RequestContext;
use roomctl_app::ports::{AudioVideoInput, Blank, Health, Info, Mute, Power, Volume};
use roomctl_domain::error::DriverError;
use roomctl_domain::response::{DeviceHealth, DeviceInfo};

use super::{Link, check_level, lock};

const INPUTS: [&str; 4] = ["hdmi1", "hdmi2", "hdmi3", "hdmi4"];

#[derive(Debug)]
struct DisplayState {
    powered_on: bool,
    input: String,
    blanked: bool,
    volume: i32,
    muted: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            powered_on: false,
            input: INPUTS[0].to_string(),
            blanked: false,
            volume: 30,
            muted: false,
        }
    }
}

/// A simulated display.
///
/// Like most real panels it ignores everything but power commands while it
/// is off.
#[derive(Debug)]
pub struct VirtualDisplay {
    link: Link,
    state: Mutex<DisplayState>,
}

impl VirtualDisplay {
    pub fn new(link: Link) -> Self {
        Self {
            link,
            state: Mutex::new(DisplayState::default()),
        }
    }

    fn when_on<T>(&self, apply: impl FnOnce(&mut DisplayState) -> T) -> Result<T, DriverError> {
        let mut state = lock(&self.state);
        if !state.powered_on {
            return Err(DriverError::msg("display is powered off"));
        }
        Ok(apply(&mut state))
    }
}

#[async_trait]
impl Power for VirtualDisplay {
    async fn get_power(&self, ctx: &RequestContext) -> Result<bool, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(lock(&self.state).powered_on)
    }

    async fn set_power(&self, ctx: &RequestContext, on: bool) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        lock(&self.state).powered_on = on;
        tracing::debug!(address = %self.link.address(), on, "display power changed");
        Ok(())
    }
}

#[async_trait]
impl AudioVideoInput for VirtualDisplay {
    async fn get_audio_video_inputs(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, String>, DriverError> {
        self.link.round_trip(ctx).await?;
        let input = lock(&self.state).input.clone();
        Ok(BTreeMap::from([(String::new(), input)]))
    }

    async fn set_audio_video_input(
        &self,
        ctx: &RequestContext,
        output: &str,
        input: &str,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        if !output.is_empty() {
            return Err(DriverError::msg(format!("unknown output {output:?}")));
        }
        if !INPUTS.contains(&input) {
            return Err(DriverError::msg(format!("unknown input {input:?}")));
        }
        self.when_on(|state| state.input = input.to_string())
    }
}

#[async_trait]
impl Blank for VirtualDisplay {
    async fn get_blank(&self, ctx: &RequestContext) -> Result<bool, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(lock(&self.state).blanked)
    }

    async fn set_blank(&self, ctx: &RequestContext, blanked: bool) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        self.when_on(|state| state.blanked = blanked)
    }
}

#[async_trait]
impl Volume for VirtualDisplay {
    async fn get_volumes(
        &self,
        ctx: &RequestContext,
        _blocks: &[String],
    ) -> Result<BTreeMap<String, i32>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(BTreeMap::from([(String::new(), lock(&self.state).volume)]))
    }

    async fn set_volume(
        &self,
        ctx: &RequestContext,
        block: &str,
        level: i32,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        if !block.is_empty() {
            return Err(DriverError::msg(format!("unknown block {block:?}")));
        }
        check_level(level)?;
        self.when_on(|state| state.volume = level)
    }
}

#[async_trait]
impl Mute for VirtualDisplay {
    async fn get_mutes(
        &self,
        ctx: &RequestContext,
        _blocks: &[String],
    ) -> Result<BTreeMap<String, bool>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(BTreeMap::from([(String::new(), lock(&self.state).muted)]))
    }

    async fn set_mute(
        &self,
        ctx: &RequestContext,
        block: &str,
        muted: bool,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        if !block.is_empty() {
            return Err(DriverError::msg(format!("unknown block {block:?}")));
        }
        self.when_on(|state| state.muted = muted)
    }
}

#[async_trait]
impl Health for VirtualDisplay {
    async fn healthy(&self, ctx: &RequestContext) -> Result<DeviceHealth, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(DeviceHealth::healthy())
    }
}

#[async_trait]
impl Info for VirtualDisplay {
    async fn info(&self, ctx: &RequestContext) -> Result<DeviceInfo, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(serde_json::json!({
            "model": "VD-1",
            "address": self.link.address(),
            "inputs": INPUTS,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn display() -> VirtualDisplay {
        VirtualDisplay::new(Link::new("10.0.0.10", Duration::ZERO))
    }

    #[tokio::test]
    async fn should_default_to_off_on_first_input() {
        let display = display();
        let ctx = RequestContext::background();

        assert!(!display.get_power(&ctx).await.unwrap());
        let inputs = display.get_audio_video_inputs(&ctx).await.unwrap();
        assert_eq!(inputs[""], "hdmi1");
    }

    #[tokio::test]
    async fn should_reject_commands_when_powered_off() {
        let display = display();
        let ctx = RequestContext::background();

        let err = display.set_blank(&ctx, true).await.unwrap_err();
        assert_eq!(err.to_string(), "display is powered off");
    }

    #[tokio::test]
    async fn should_switch_input_when_powered_on() {
        let display = display();
        let ctx = RequestContext::background();

        display.set_power(&ctx, true).await.unwrap();
        display.set_audio_video_input(&ctx, "", "hdmi3").await.unwrap();

        let inputs = display.get_audio_video_inputs(&ctx).await.unwrap();
        assert_eq!(inputs[""], "hdmi3");
    }

    #[tokio::test]
    async fn should_reject_unknown_input() {
        let display = display();
        let ctx = RequestContext::background();
        display.set_power(&ctx, true).await.unwrap();

        let err = display
            .set_audio_video_input(&ctx, "", "vga")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown input \"vga\"");
    }

    #[tokio::test]
    async fn should_store_volume_and_mute_on_default_block() {
        let display = display();
        let ctx = RequestContext::background();
        display.set_power(&ctx, true).await.unwrap();

        display.set_volume(&ctx, "", 55).await.unwrap();
        display.set_mute(&ctx, "", true).await.unwrap();

        assert_eq!(display.get_volumes(&ctx, &[]).await.unwrap()[""], 55);
        assert!(display.get_mutes(&ctx, &[]).await.unwrap()[""]);
    }
}
