//! # roomctl-app
//!
//! Application layer — **port definitions** (traits), the driver registry and
//! the state reconciliation engine.
//!
//! ## Responsibilities
//! - Define the **capability ports** a device handle may satisfy
//!   (`Power`, `AudioVideoInput`, `AudioInput`, `VideoInput`, `Blank`,
//!   `Volume`, `Mute`, `Health`, `Info`)
//! - Define the **driver port** (`Driver`) that turns an address into a
//!   [`DeviceHandle`](ports::DeviceHandle), and the **room store port**
//!   (`RoomStore`) that resolves a room id into its configuration
//! - Provide the [`DriverRegistry`](registry::DriverRegistry) with its
//!   single-flight, memoizing device cache
//! - Provide the [`Engine`](engine::Engine): concurrent fan-out of
//!   Get / Set / Health / Info across a room's devices, merged into one
//!   deterministic response
//!
//! ## Dependency rule
//! Depends on `roomctl-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod context;
pub mod engine;
pub mod ports;
pub mod registry;

#[cfg(test)]
mod testing;
