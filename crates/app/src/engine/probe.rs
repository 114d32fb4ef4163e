//! Single-field probes: health and info.

use roomctl_domain::field;
use roomctl_domain::response::{DeviceHealth, DeviceInfo, DeviceStateError};

use super::accumulator::call;
use super::fan_out::{DeviceJob, Outcome};

/// Ask the device whether it is healthy. Devices without the contract stay silent.
pub(crate) async fn probe_health(job: DeviceJob<()>) -> Outcome<DeviceHealth> {
    let Some(health) = job.handle.health() else {
        return Outcome::empty();
    };
    match call(&job.ctx, health.healthy(&job.ctx)).await {
        Ok(report) => Outcome::reported(report),
        Err(err) => {
            tracing::debug!(device = %job.id, error = %err, "health probe failed");
            Outcome::failed(DeviceStateError::new(job.id, field::HEALTHY, None, err))
        }
    }
}

pub(crate) async fn probe_info(job: DeviceJob<()>) -> Outcome<DeviceInfo> {
    let Some(info) = job.handle.info() else {
        return Outcome::empty();
    };
    match call(&job.ctx, info.info(&job.ctx)).await {
        Ok(report) => Outcome::reported(report),
        Err(err) => {
            tracing::debug!(device = %job.id, error = %err, "info probe failed");
            Outcome::failed(DeviceStateError::new(job.id, field::INFO, None, err))
        }
    }
}
