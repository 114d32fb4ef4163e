//! JSON handlers for room state, health and info.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use roomctl_app::ports::RoomStore;
use roomctl_domain::response::{DeviceHealth, DeviceInfo, RoomResponse};
use roomctl_domain::state::{DeviceState, StateRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from every room endpoint.
///
/// The body is the same either way; only the status tells a client whether
/// every device did what was asked.
pub enum RoomReply<T> {
    Complete(Json<RoomResponse<T>>),
    Partial(Json<RoomResponse<T>>),
}

impl<T> From<RoomResponse<T>> for RoomReply<T> {
    fn from(response: RoomResponse<T>) -> Self {
        if response.has_errors() {
            Self::Partial(Json(response))
        } else {
            Self::Complete(Json(response))
        }
    }
}

impl<T: Serialize> IntoResponse for RoomReply<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Complete(json) => json.into_response(),
            Self::Partial(json) => (StatusCode::INTERNAL_SERVER_ERROR, json).into_response(),
        }
    }
}

/// `GET /room/{id}/state`
pub async fn get_state<RS>(
    State(state): State<AppState<RS>>,
    Path(id): Path<String>,
) -> Result<RoomReply<DeviceState>, ApiError>
where
    RS: RoomStore + 'static,
{
    let room = state.room(&id).await?;
    let ctx = state.request_context();
    let response = state.engine.get_state(&ctx, &room).await?;
    Ok(response.into())
}

/// `PUT /room/{id}/state`
pub async fn set_state<RS>(
    State(state): State<AppState<RS>>,
    Path(id): Path<String>,
    Json(request): Json<StateRequest>,
) -> Result<RoomReply<DeviceState>, ApiError>
where
    RS: RoomStore + 'static,
{
    let room = state.room(&id).await?;
    let ctx = state.request_context();
    let response = state.engine.set_state(&ctx, &room, &request).await?;
    Ok(response.into())
}

/// `GET /room/{id}/health`
pub async fn health<RS>(
    State(state): State<AppState<RS>>,
    Path(id): Path<String>,
) -> Result<RoomReply<DeviceHealth>, ApiError>
where
    RS: RoomStore + 'static,
{
    let room = state.room(&id).await?;
    let ctx = state.request_context();
    let response = state.engine.health(&ctx, &room).await?;
    Ok(response.into())
}

/// `GET /room/{id}/info`
pub async fn info<RS>(
    State(state): State<AppState<RS>>,
    Path(id): Path<String>,
) -> Result<RoomReply<DeviceInfo>, ApiError>
where
    RS: RoomStore + 'static,
{
    let room = state.room(&id).await?;
    let ctx = state.request_context();
    let response = state.engine.info(&ctx, &room).await?;
    Ok(response.into())
}
