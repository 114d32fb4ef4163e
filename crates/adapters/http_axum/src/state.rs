//! Shared application state for axum handlers.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use roomctl_app::context::RequestContext;
use roomctl_app::engine::Engine;
use roomctl_app::ports::RoomStore;
use roomctl_domain::error::RoomCtlError;
use roomctl_domain::id::RoomId;
use roomctl_domain::room::RoomConfig;

/// Application state shared across all axum handlers.
///
/// Generic over the room store to avoid dynamic dispatch. `Clone` is
/// implemented manually so the store itself does not need to be `Clone`;
/// only the `Arc` wrappers are cloned.
pub struct AppState<RS> {
    /// Reconciliation engine, holding the driver registry.
    pub engine: Arc<Engine>,
    /// Where room configurations come from.
    pub rooms: Arc<RS>,
    /// Upper bound for one request; `None` waits for every device.
    pub request_timeout: Option<Duration>,
}

impl<RS> Clone for AppState<RS> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            rooms: Arc::clone(&self.rooms),
            request_timeout: self.request_timeout,
        }
    }
}

impl<RS> AppState<RS>
where
    RS: RoomStore + 'static,
{
    pub fn new(engine: Engine, rooms: RS, request_timeout: Option<Duration>) -> Self {
        Self::from_arcs(Arc::new(engine), Arc::new(rooms), request_timeout)
    }

    /// Create a new application state from pre-wrapped `Arc`s.
    pub fn from_arcs(engine: Arc<Engine>, rooms: Arc<RS>, request_timeout: Option<Duration>) -> Self {
        Self {
            engine,
            rooms,
            request_timeout,
        }
    }

    /// A fresh context for one request.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        match self.request_timeout {
            Some(timeout) => RequestContext::with_timeout(timeout),
            None => RequestContext::background(),
        }
    }

    /// Parse `id` and load that room.
    ///
    /// # Errors
    ///
    /// [`RoomCtlError::Validation`] for a malformed id, otherwise whatever the
    /// store reports.
    pub async fn room(&self, id: &str) -> Result<RoomConfig, RoomCtlError> {
        let id = RoomId::from_str(id)?;
        self.rooms.room_config(&id).await
    }
}
