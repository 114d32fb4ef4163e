//! Virtual DSP — any number of named gain blocks, each with its own level and mute.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use roomctl_app::context::RequestContext;
use roomctl_app::ports::{Health, Info, Mute, Volume};
use roomctl_domain::error::DriverError;
use roomctl_domain::response::{DeviceHealth, DeviceInfo};

use super::{Link, check_level, lock};

const DEFAULT_LEVEL: i32 = 50;

#[derive(Debug, Clone, Copy)]
struct Block {
    level: i32,
    muted: bool,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            muted: false,
        }
    }
}

/// A simulated DSP. Blocks spring into existence on first use.
#[derive(Debug)]
pub struct VirtualDsp {
    link: Link,
    blocks: Mutex<BTreeMap<String, Block>>,
}

impl VirtualDsp {
    pub fn new(link: Link) -> Self {
        Self {
            link,
            blocks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Read `pick` from each requested block, or from the default block when none are named.
    fn read<T>(&self, blocks: &[String], pick: impl Fn(&Block) -> T) -> BTreeMap<String, T> {
        let mut state = lock(&self.blocks);
        let default = [String::new()];
        let names = if blocks.is_empty() { &default[..] } else { blocks };
        names
            .iter()
            .map(|name| (name.clone(), pick(state.entry(name.clone()).or_default())))
            .collect()
    }

    fn write(&self, block: &str, apply: impl FnOnce(&mut Block)) {
        apply(lock(&self.blocks).entry(block.to_string()).or_default());
    }
}

#[async_trait]
impl Volume for VirtualDsp {
    async fn get_volumes(
        &self,
        ctx: &RequestContext,
        blocks: &[String],
    ) -> Result<BTreeMap<String, i32>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(self.read(blocks, |b| b.level))
    }

    async fn set_volume(
        &self,
        ctx: &RequestContext,
        block: &str,
        level: i32,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        check_level(level)?;
        self.write(block, |b| b.level = level);
        Ok(())
    }
}

#[async_trait]
impl Mute for VirtualDsp {
    async fn get_mutes(
        &self,
        ctx: &RequestContext,
        blocks: &[String],
    ) -> Result<BTreeMap<String, bool>, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(self.read(blocks, |b| b.muted))
    }

    async fn set_mute(
        &self,
        ctx: &RequestContext,
        block: &str,
        muted: bool,
    ) -> Result<(), DriverError> {
        self.link.round_trip(ctx).await?;
        self.write(block, |b| b.muted = muted);
        Ok(())
    }
}

#[async_trait]
impl Health for VirtualDsp {
    async fn healthy(&self, ctx: &RequestContext) -> Result<DeviceHealth, DriverError> {
        self.link.round_trip(ctx).await?;
        Ok(DeviceHealth::healthy())
    }
}

#[async_trait]
impl Info for VirtualDsp {
    async fn info(&self, ctx: &RequestContext) -> Result<DeviceInfo, DriverError> {
        self.link.round_trip(ctx).await?;
        let blocks: Vec<String> = lock(&self.blocks).keys().cloned().collect();
        Ok(serde_json::json!({
            "model": "VDSP-8",
            "address": self.link.address(),
            "blocks": blocks,
        }))
    }
}
