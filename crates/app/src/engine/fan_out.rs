//! Fan-out/fan-in: one task per device, one merged response.

use std::collections::BTreeSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;

use roomctl_domain::error::FieldError;
use roomctl_domain::field;
use roomctl_domain::id::DeviceId;
use roomctl_domain::response::{DeviceStateError, RoomResponse};
use roomctl_domain::room::DeviceConfig;

use crate::context::RequestContext;
use crate::ports::{DeviceHandle, Driver};
use crate::registry::CachingDriver;

/// A device whose driver has already been resolved, with its share of the request.
pub(crate) struct Target<P> {
    pub id: DeviceId,
    pub config: DeviceConfig,
    pub driver: Arc<CachingDriver>,
    pub payload: P,
}

/// Everything a per-device routine needs once the handle is open.
pub(crate) struct DeviceJob<P> {
    pub id: DeviceId,
    pub config: DeviceConfig,
    pub handle: DeviceHandle,
    pub ctx: RequestContext,
    pub payload: P,
}

/// What one device task reports back.
pub(crate) struct Outcome<T> {
    pub data: Option<T>,
    pub errors: Vec<DeviceStateError>,
}

impl<T> Outcome<T> {
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    pub fn reported(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failed(error: DeviceStateError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }
}

/// Run `work` for every target concurrently and merge the outcomes.
///
/// Waits for exactly one outcome per target, or until `ctx` ends; devices
/// that have not reported by then get one device-level error each. Errors
/// come back sorted.
pub(crate) async fn fan_out<P, T, F, Fut>(
    ctx: &RequestContext,
    targets: Vec<Target<P>>,
    work: F,
) -> RoomResponse<T>
where
    P: Send + 'static,
    T: Send + 'static,
    F: Fn(DeviceJob<P>) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
{
    let mut pending: BTreeSet<DeviceId> = targets.iter().map(|t| t.id.clone()).collect();
    let mut tasks = JoinSet::new();
    for target in targets {
        tasks.spawn(run_device(ctx.clone(), target, work.clone()));
    }

    let mut response = RoomResponse::default();
    loop {
        let next = ctx.run(tasks.join_next()).await;
        let (id, outcome) = match next {
            Ok(Some(Ok(reported))) => reported,
            Ok(Some(Err(err))) => {
                // Device work and device creation both catch their own panics.
                tracing::error!(error = %err, "device task failed to report");
                continue;
            }
            Ok(None) => break,
            Err(err) => {
                tasks.abort_all();
                tracing::warn!(error = %err, unreported = pending.len(), "giving up on devices");
                for id in std::mem::take(&mut pending) {
                    response
                        .errors
                        .push(DeviceStateError::new(id, field::DEVICE, None, err));
                }
                break;
            }
        };

        pending.remove(&id);
        if let Some(data) = outcome.data {
            response.devices.insert(id, data);
        }
        response.errors.extend(outcome.errors);
    }

    for id in pending {
        response.errors.push(DeviceStateError::new(
            id,
            field::DEVICE,
            None,
            "device task failed to report",
        ));
    }

    response.sort_errors();
    response
}

async fn run_device<P, T, F, Fut>(
    ctx: RequestContext,
    target: Target<P>,
    work: F,
) -> (DeviceId, Outcome<T>)
where
    F: Fn(DeviceJob<P>) -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let Target {
        id,
        config,
        driver,
        payload,
    } = target;

    let created = ctx.run(driver.create_device(&ctx, &config.address)).await;
    let handle = match created {
        Ok(Ok(handle)) => handle,
        Ok(Err(err)) => {
            tracing::warn!(device = %id, address = %config.address, error = %err, "unable to create device");
            let error = DeviceStateError::new(id.clone(), field::DEVICE, None, FieldError::Create(err));
            return (id, Outcome::failed(error));
        }
        Err(err) => {
            let error = DeviceStateError::new(id.clone(), field::DEVICE, None, err);
            return (id, Outcome::failed(error));
        }
    };

    let job = DeviceJob {
        id: id.clone(),
        config,
        handle,
        ctx,
        payload,
    };
    match AssertUnwindSafe(work(job)).catch_unwind().await {
        Ok(outcome) => (id, outcome),
        Err(_) => {
            tracing::error!(device = %id, "device task panicked");
            let error = DeviceStateError::new(id.clone(), field::DEVICE, None, "device task panicked");
            (id, Outcome::failed(error))
        }
    }
}
