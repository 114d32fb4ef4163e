//! Sparse device state.
//!
//! Every field is optional: absence means "not requested" in a desired state
//! and "unsupported or unread" in an achieved state. A missing field is never
//! the same thing as `false` or `0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::InputKind;
use crate::id::DeviceId;

/// Desired or achieved state of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powered_on: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanked: Option<bool>,

    /// Input routed to each output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, Input>>,

    /// Volume level per block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<BTreeMap<String, i32>>,

    /// Mute flag per block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutes: Option<BTreeMap<String, bool>>,
}

/// What is routed to one output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_video: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

/// Desired state for a subset of the devices in a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRequest {
    #[serde(default)]
    pub devices: BTreeMap<DeviceId, DeviceState>,
}

impl DeviceState {
    /// Whether no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.powered_on.is_none()
            && self.blanked.is_none()
            && self.inputs.as_ref().is_none_or(BTreeMap::is_empty)
            && self.volumes.as_ref().is_none_or(BTreeMap::is_empty)
            && self.mutes.as_ref().is_none_or(BTreeMap::is_empty)
    }

    /// Record the input routed to `output` for one signal kind.
    pub fn set_input(&mut self, output: &str, kind: InputKind, input: String) {
        let entry = self
            .inputs
            .get_or_insert_with(BTreeMap::new)
            .entry(output.to_string())
            .or_default();
        *entry.slot_mut(kind) = Some(input);
    }

    /// Record the volume of one block.
    pub fn set_volume(&mut self, block: &str, level: i32) {
        self.volumes
            .get_or_insert_with(BTreeMap::new)
            .insert(block.to_string(), level);
    }

    /// Record the mute flag of one block.
    pub fn set_mute(&mut self, block: &str, muted: bool) {
        self.mutes
            .get_or_insert_with(BTreeMap::new)
            .insert(block.to_string(), muted);
    }

    /// Every `(output, input)` pair requested for one signal kind.
    #[must_use]
    pub fn routes(&self, kind: InputKind) -> Vec<(String, String)> {
        self.inputs
            .iter()
            .flatten()
            .filter_map(|(output, input)| {
                input
                    .slot(kind)
                    .map(|routed| (output.clone(), routed.clone()))
            })
            .collect()
    }
}

impl Input {
    /// The input carried for one signal kind, if any.
    #[must_use]
    pub fn slot(&self, kind: InputKind) -> Option<&String> {
        match kind {
            InputKind::AudioVideo => self.audio_video.as_ref(),
            InputKind::Audio => self.audio.as_ref(),
            InputKind::Video => self.video.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: InputKind) -> &mut Option<String> {
        match kind {
            InputKind::AudioVideo => &mut self.audio_video,
            InputKind::Audio => &mut self.audio,
            InputKind::Video => &mut self.video,
        }
    }
}
