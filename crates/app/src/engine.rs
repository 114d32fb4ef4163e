//! Reconciliation engine — fans one room request out to its devices.
//!
//! Every operation follows the same shape: fatal preconditions are checked
//! before any device is contacted, then one task per device opens a handle
//! through the registry and runs the per-device routine, and the coordinator
//! merges exactly one report per device into a [`RoomResponse`].
//!
//! [`RoomResponse`]: roomctl_domain::response::RoomResponse

mod accumulator;
mod fan_out;
mod get;
mod probe;
mod set;

use std::sync::Arc;

use roomctl_domain::error::RoomCtlError;
use roomctl_domain::id::DeviceId;
use roomctl_domain::response::{HealthResponse, InfoResponse, StateResponse};
use roomctl_domain::room::RoomConfig;
use roomctl_domain::state::StateRequest;

use self::fan_out::{Target, fan_out};
use crate::context::RequestContext;
use crate::registry::DriverRegistry;

/// Get/Set/Health/Info over every device of a room.
pub struct Engine {
    registry: Arc<DriverRegistry>,
}

impl Engine {
    #[must_use]
    pub fn new(registry: Arc<DriverRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Read the current state of every device in the room.
    ///
    /// # Errors
    ///
    /// [`RoomCtlError::Cancelled`] if `ctx` already ended,
    /// [`RoomCtlError::EmptyRoom`] for a room without devices,
    /// [`RoomCtlError::UnknownDriver`] when a device names an unregistered
    /// driver. Per-device failures are reported inside the response instead.
    #[tracing::instrument(skip_all, fields(room = %room.id))]
    pub async fn get_state(
        &self,
        ctx: &RequestContext,
        room: &RoomConfig,
    ) -> Result<StateResponse, RoomCtlError> {
        let targets = self.whole_room(ctx, room)?;
        let response = fan_out(ctx, targets, get::read_state).await;
        tracing::debug!(
            devices = response.devices.len(),
            errors = response.errors.len(),
            "room state read"
        );
        Ok(response)
    }

    /// Apply a desired partial state and report what was achieved.
    ///
    /// Only devices named in `request` with a non-empty desired state are
    /// contacted.
    ///
    /// # Errors
    ///
    /// As [`get_state`](Self::get_state), plus [`RoomCtlError::InvalidDevice`]
    /// for the first requested id (in id order) that is not part of the room.
    #[tracing::instrument(skip_all, fields(room = %room.id, requested = request.devices.len()))]
    pub async fn set_state(
        &self,
        ctx: &RequestContext,
        room: &RoomConfig,
        request: &StateRequest,
    ) -> Result<StateResponse, RoomCtlError> {
        check_live(ctx, room)?;
        if let Some(id) = request
            .devices
            .keys()
            .find(|id| !room.devices.contains_key(*id))
        {
            return Err(RoomCtlError::InvalidDevice(id.clone()));
        }

        let wanted = request
            .devices
            .iter()
            .filter(|(_, desired)| !desired.is_empty())
            .map(|(id, desired)| (id.clone(), desired.clone()));
        let targets = self.resolve(room, wanted)?;
        let response = fan_out(ctx, targets, set::apply_state).await;
        tracing::debug!(
            devices = response.devices.len(),
            errors = response.errors.len(),
            "room state applied"
        );
        Ok(response)
    }

    /// Probe the health of every device that reports it.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`get_state`](Self::get_state).
    #[tracing::instrument(skip_all, fields(room = %room.id))]
    pub async fn health(
        &self,
        ctx: &RequestContext,
        room: &RoomConfig,
    ) -> Result<HealthResponse, RoomCtlError> {
        let targets = self.whole_room(ctx, room)?;
        Ok(fan_out(ctx, targets, probe::probe_health).await)
    }

    /// Collect the information every device reports about itself.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`get_state`](Self::get_state).
    #[tracing::instrument(skip_all, fields(room = %room.id))]
    pub async fn info(
        &self,
        ctx: &RequestContext,
        room: &RoomConfig,
    ) -> Result<InfoResponse, RoomCtlError> {
        let targets = self.whole_room(ctx, room)?;
        Ok(fan_out(ctx, targets, probe::probe_info).await)
    }

    fn whole_room(
        &self,
        ctx: &RequestContext,
        room: &RoomConfig,
    ) -> Result<Vec<Target<()>>, RoomCtlError> {
        check_live(ctx, room)?;
        self.resolve(room, room.devices.keys().map(|id| (id.clone(), ())))
    }

    /// Pair each wanted device with its config and registered driver.
    fn resolve<P>(
        &self,
        room: &RoomConfig,
        wanted: impl Iterator<Item = (DeviceId, P)>,
    ) -> Result<Vec<Target<P>>, RoomCtlError> {
        wanted
            .map(|(id, payload)| {
                let config = room
                    .devices
                    .get(&id)
                    .ok_or_else(|| RoomCtlError::InvalidDevice(id.clone()))?;
                let driver = self.registry.get(&config.driver).ok_or_else(|| {
                    RoomCtlError::UnknownDriver {
                        device: id.clone(),
                        driver: config.driver.clone(),
                    }
                })?;
                Ok(Target {
                    config: config.clone(),
                    id,
                    driver,
                    payload,
                })
            })
            .collect()
    }
}

fn check_live(ctx: &RequestContext, room: &RoomConfig) -> Result<(), RoomCtlError> {
    if let Some(err) = ctx.err() {
        return Err(RoomCtlError::Cancelled(err));
    }
    if room.devices.is_empty() {
        return Err(RoomCtlError::EmptyRoom(room.id.clone()));
    }
    Ok(())
}
