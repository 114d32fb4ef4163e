//! Typed identifier newtypes backed by strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $validate:expr) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier.
            ///
            /// # Errors
            ///
            /// Returns a [`ValidationError`] when the value is malformed.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                let validate: fn(&str) -> Result<(), ValidationError> = $validate;
                validate(&value)?;
                Ok(Self(value))
            }

            /// Access the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a device inside a room (e.g. `D1`, `SW1`, `DSP1`).
    DeviceId,
    |value| {
        if value.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        Ok(())
    }
);

define_id!(
    /// Identifier of a room, formatted as `Building-Room` (e.g. `ITB-1101`).
    RoomId,
    |value| match value.split_once('-') {
        Some((building, room))
            if !building.is_empty() && !room.is_empty() && !room.contains('-') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::MalformedRoomId(value.to_string())),
    }
);

impl RoomId {
    /// The building part of the identifier.
    #[must_use]
    pub fn building(&self) -> &str {
        self.0.split_once('-').map_or(&self.0, |(building, _)| building)
    }

    /// The room part of the identifier.
    #[must_use]
    pub fn room(&self) -> &str {
        self.0.split_once('-').map_or("", |(_, room)| room)
    }
}
