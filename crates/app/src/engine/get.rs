//! Reading the current state of one device.

use futures::future::{BoxFuture, FutureExt, join_all};

use roomctl_domain::field::{self, InputKind};
use roomctl_domain::room::{MUTE_PORT, VOLUME_PORT};
use roomctl_domain::state::DeviceState;

use super::accumulator::{Accumulator, call, call_field};
use super::fan_out::{DeviceJob, Outcome};
use crate::context::RequestContext;
use crate::ports::{Blank, DeviceHandle, Mute, Power, Volume};

/// Read every field the handle can report, concurrently.
///
/// Contracts the handle lacks are skipped without an error.
pub(crate) async fn read_state(job: DeviceJob<()>) -> Outcome<DeviceState> {
    let DeviceJob {
        id,
        config,
        handle,
        ctx,
        ..
    } = job;
    let acc = Accumulator::new(id);
    let volume_blocks = config.blocks(VOLUME_PORT);
    let mute_blocks = config.blocks(MUTE_PORT);

    let mut reads: Vec<BoxFuture<'_, ()>> = Vec::new();
    if let Some(power) = handle.power() {
        reads.push(read_power(&ctx, power, &acc).boxed());
    }
    for kind in InputKind::ALL {
        if handle.supports_input(kind) {
            reads.push(read_inputs(&ctx, &handle, kind, &acc).boxed());
        }
    }
    if let Some(blank) = handle.blank() {
        reads.push(read_blank(&ctx, blank, &acc).boxed());
    }
    if let Some(volume) = handle.volume() {
        reads.push(read_volumes(&ctx, volume, &volume_blocks, &acc).boxed());
    }
    if let Some(mute) = handle.mute() {
        reads.push(read_mutes(&ctx, mute, &mute_blocks, &acc).boxed());
    }

    join_all(reads).await;
    acc.finish()
}

async fn read_power(ctx: &RequestContext, power: &dyn Power, acc: &Accumulator) {
    match call(ctx, power.get_power(ctx)).await {
        Ok(on) => acc.record(|s| s.powered_on = Some(on)),
        Err(err) => acc.fail(field::POWERED_ON, None, err),
    }
}

async fn read_inputs(
    ctx: &RequestContext,
    handle: &DeviceHandle,
    kind: InputKind,
    acc: &Accumulator,
) {
    match call_field(ctx, handle.get_inputs(ctx, kind)).await {
        Ok(inputs) => acc.record(|s| {
            for (output, input) in inputs {
                s.set_input(&output, kind, input);
            }
        }),
        Err(err) => acc.fail(field::inputs(kind), None, err),
    }
}

async fn read_blank(ctx: &RequestContext, blank: &dyn Blank, acc: &Accumulator) {
    match call(ctx, blank.get_blank(ctx)).await {
        Ok(blanked) => acc.record(|s| s.blanked = Some(blanked)),
        Err(err) => acc.fail(field::BLANKED, None, err),
    }
}

async fn read_volumes(
    ctx: &RequestContext,
    volume: &dyn Volume,
    blocks: &[String],
    acc: &Accumulator,
) {
    match call(ctx, volume.get_volumes(ctx, blocks)).await {
        Ok(levels) => acc.record(|s| {
            for (block, level) in levels {
                s.set_volume(&block, level);
            }
        }),
        Err(err) => acc.fail(field::VOLUMES, None, err),
    }
}

async fn read_mutes(ctx: &RequestContext, mute: &dyn Mute, blocks: &[String], acc: &Accumulator) {
    match call(ctx, mute.get_mutes(ctx, blocks)).await {
        Ok(mutes) => acc.record(|s| {
            for (block, muted) in mutes {
                s.set_mute(&block, muted);
            }
        }),
        Err(err) => acc.fail(field::MUTES, None, err),
    }
}
