//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod capability;
pub mod device;
pub mod driver;
pub mod room_store;

pub use capability::{
    AudioInput, AudioVideoInput, Blank, Capability, Health, Info, Mute, Power, VideoInput, Volume,
};
pub use device::{DeviceHandle, DeviceHandleBuilder};
pub use driver::Driver;
pub use room_store::RoomStore;
