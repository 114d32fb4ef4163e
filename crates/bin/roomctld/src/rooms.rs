//! Room store backed by the rooms declared in the configuration file.

use std::collections::HashMap;

use roomctl_app::ports::RoomStore;
use roomctl_domain::error::{NotFoundError, RoomCtlError};
use roomctl_domain::id::RoomId;
use roomctl_domain::room::RoomConfig;

/// Fixed set of rooms, loaded once at startup.
#[derive(Debug, Default)]
pub struct StaticRoomStore {
    rooms: HashMap<RoomId, RoomConfig>,
}

impl StaticRoomStore {
    #[must_use]
    pub fn new(rooms: impl IntoIterator<Item = RoomConfig>) -> Self {
        Self {
            rooms: rooms
                .into_iter()
                .map(|room| (room.id.clone(), room))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomConfig> {
        self.rooms.values()
    }
}

impl RoomStore for StaticRoomStore {
    async fn room_config(&self, id: &RoomId) -> Result<RoomConfig, RoomCtlError> {
        self.rooms.get(id).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Room",
                id: id.to_string(),
            }
            .into()
        })
    }
}
