//! # roomctld — roomctl daemon
//!
//! Composition root that wires all adapters together.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Register every driver and hand it its driver-wide settings
//! - Load the configured rooms into the room store
//! - Build the engine and the axum router around them
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

pub mod config;
pub mod rooms;

use std::sync::Arc;

use roomctl_adapter_http_axum::router;
use roomctl_adapter_http_axum::state::AppState;
use roomctl_app::engine::Engine;
use roomctl_app::registry::{DriverRegistry, RegistryError};

use crate::config::{Config, ConfigError};
use crate::rooms::StaticRoomStore;

/// Errors that stop the daemon before it serves anything.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Build the fully-wired router for `config`.
///
/// # Errors
///
/// Returns [`StartupError`] when a driver rejects its settings, settings
/// name an unregistered driver, or a room is malformed.
pub fn build_app(config: &Config) -> Result<axum::Router, StartupError> {
    let registry = DriverRegistry::new();
    roomctl_adapter_virtual::register_all(&registry)?;
    for (name, settings) in config.driver_settings()? {
        registry.configure(name, &settings)?;
        tracing::debug!(driver = name, "driver configured");
    }

    let rooms = StaticRoomStore::new(config.room_configs()?);
    for room in rooms.iter() {
        for (device, device_config) in &room.devices {
            if registry.get(&device_config.driver).is_none() {
                tracing::warn!(
                    room = %room.id,
                    %device,
                    driver = %device_config.driver,
                    "device uses an unregistered driver, requests to this room will fail"
                );
            }
        }
    }
    tracing::info!(
        rooms = rooms.len(),
        drivers = ?registry.list(),
        "roomctl configured"
    );

    let engine = Engine::new(Arc::new(registry));
    let state = AppState::new(engine, rooms, Some(config.request_timeout()));
    Ok(router::build(state))
}
