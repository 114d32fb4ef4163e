//! Applying a desired state to one device.

use std::collections::BTreeMap;

use futures::future::{BoxFuture, FutureExt, join_all};
use serde_json::json;

use roomctl_domain::error::FieldError;
use roomctl_domain::field::{self, InputKind};
use roomctl_domain::room::{DeviceConfig, MUTE_PORT, VOLUME_PORT};
use roomctl_domain::state::DeviceState;

use super::accumulator::{Accumulator, call, call_field};
use super::fan_out::{DeviceJob, Outcome};
use crate::context::RequestContext;
use crate::ports::DeviceHandle;

/// Apply the requested fields and echo back every one that succeeded.
///
/// Power is applied first and alone; everything else starts only once power
/// has resolved, since a device that is off usually rejects other commands.
pub(crate) async fn apply_state(job: DeviceJob<DeviceState>) -> Outcome<DeviceState> {
    let DeviceJob {
        id,
        config,
        handle,
        ctx,
        payload: desired,
    } = job;
    let acc = Accumulator::new(id);

    let volumes = valid_blocks(&config, VOLUME_PORT, desired.volumes.as_ref(), field::volume, &acc);
    let mutes = valid_blocks(&config, MUTE_PORT, desired.mutes.as_ref(), field::mute, &acc);

    if let Some(on) = desired.powered_on {
        set_power(&ctx, &handle, on, &acc).await;
    }

    let mut writes: Vec<BoxFuture<'_, ()>> = Vec::new();
    for kind in InputKind::ALL {
        let routes = desired.routes(kind);
        if !routes.is_empty() {
            writes.push(route_inputs(&ctx, &handle, kind, routes, &acc).boxed());
        }
    }
    if let Some(blanked) = desired.blanked {
        writes.push(set_blank(&ctx, &handle, blanked, &acc).boxed());
    }
    for (block, level) in volumes {
        writes.push(set_volume(&ctx, &handle, block, level, &acc).boxed());
    }
    for (block, muted) in mutes {
        writes.push(set_mute(&ctx, &handle, block, muted, &acc).boxed());
    }

    join_all(writes).await;
    acc.finish()
}

/// Requested `(block, value)` pairs that the device declares under `kind`.
///
/// Undeclared blocks are reported as [`FieldError::InvalidBlock`] and never
/// reach the driver.
fn valid_blocks<V>(
    config: &DeviceConfig,
    kind: &str,
    requested: Option<&BTreeMap<String, V>>,
    path: fn(&str) -> String,
    acc: &Accumulator,
) -> Vec<(String, V)>
where
    V: Copy + Into<serde_json::Value>,
{
    let mut valid = Vec::new();
    for (block, value) in requested.into_iter().flatten() {
        if config.accepts_block(block, kind) {
            valid.push((block.clone(), *value));
        } else {
            acc.fail(path(block), Some((*value).into()), FieldError::InvalidBlock);
        }
    }
    valid
}

async fn set_power(ctx: &RequestContext, handle: &DeviceHandle, on: bool, acc: &Accumulator) {
    let result = match handle.power() {
        Some(power) => call(ctx, power.set_power(ctx, on)).await,
        None => Err(FieldError::NotCapable),
    };
    match result {
        Ok(()) => acc.record(|s| s.powered_on = Some(on)),
        Err(err) => acc.fail(field::POWERED_ON, Some(json!(on)), err),
    }
}

/// Walk every output of one signal kind in order.
async fn route_inputs(
    ctx: &RequestContext,
    handle: &DeviceHandle,
    kind: InputKind,
    routes: Vec<(String, String)>,
    acc: &Accumulator,
) {
    for (output, input) in routes {
        let result = if handle.supports_input(kind) {
            call_field(ctx, handle.set_input(ctx, kind, &output, &input)).await
        } else {
            Err(FieldError::NotCapable)
        };
        match result {
            Ok(()) => acc.record(|s| s.set_input(&output, kind, input)),
            Err(err) => acc.fail(field::input(&output, kind), Some(json!(input)), err),
        }
    }
}

async fn set_blank(ctx: &RequestContext, handle: &DeviceHandle, blanked: bool, acc: &Accumulator) {
    let result = match handle.blank() {
        Some(blank) => call(ctx, blank.set_blank(ctx, blanked)).await,
        None => Err(FieldError::NotCapable),
    };
    match result {
        Ok(()) => acc.record(|s| s.blanked = Some(blanked)),
        Err(err) => acc.fail(field::BLANKED, Some(json!(blanked)), err),
    }
}

async fn set_volume(
    ctx: &RequestContext,
    handle: &DeviceHandle,
    block: String,
    level: i32,
    acc: &Accumulator,
) {
    let result = match handle.volume() {
        Some(volume) => call(ctx, volume.set_volume(ctx, &block, level)).await,
        None => Err(FieldError::NotCapable),
    };
    match result {
        Ok(()) => acc.record(|s| s.set_volume(&block, level)),
        Err(err) => acc.fail(field::volume(&block), Some(json!(level)), err),
    }
}

async fn set_mute(
    ctx: &RequestContext,
    handle: &DeviceHandle,
    block: String,
    muted: bool,
    acc: &Accumulator,
) {
    let result = match handle.mute() {
        Some(mute) => call(ctx, mute.set_mute(ctx, &block, muted)).await,
        None => Err(FieldError::NotCapable),
    };
    match result {
        Ok(()) => acc.record(|s| s.set_mute(&block, muted)),
        Err(err) => acc.fail(field::mute(&block), Some(json!(muted)), err),
    }
}
