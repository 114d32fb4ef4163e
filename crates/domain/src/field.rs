//! Stable dotted field paths used in [`DeviceStateError`](crate::response::DeviceStateError).
//!
//! Paths mirror the JSON shape of [`DeviceState`](crate::state::DeviceState):
//! `poweredOn`, `blanked`, `volumes.<block>`, `mutes.<block>`,
//! `input.<output>.<audioVideo|audio|video>`. The empty path denotes a
//! failure of the device as a whole.

use std::fmt;

pub const DEVICE: &str = "";
pub const POWERED_ON: &str = "poweredOn";
pub const BLANKED: &str = "blanked";
pub const VOLUMES: &str = "volumes";
pub const MUTES: &str = "mutes";
pub const HEALTHY: &str = "healthy";
pub const INFO: &str = "info";

/// Which signal an input route carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputKind {
    AudioVideo,
    Audio,
    Video,
}

impl InputKind {
    pub const ALL: [Self; 3] = [Self::AudioVideo, Self::Audio, Self::Video];

    /// JSON key of this kind inside an `Input`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AudioVideo => "audioVideo",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `volumes.<block>`
#[must_use]
pub fn volume(block: &str) -> String {
    format!("{VOLUMES}.{block}")
}

/// `mutes.<block>`
#[must_use]
pub fn mute(block: &str) -> String {
    format!("{MUTES}.{block}")
}

/// `input.<output>.<kind>`
#[must_use]
pub fn input(output: &str, kind: InputKind) -> String {
    format!("input.{output}.{kind}")
}

/// `input.<kind>`: used when reading every output of one kind fails.
#[must_use]
pub fn inputs(kind: InputKind) -> String {
    format!("input.{kind}")
}
