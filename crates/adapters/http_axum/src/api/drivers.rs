//! Diagnostic listing of registered drivers.

use axum::Json;
use axum::extract::State;

use roomctl_app::ports::RoomStore;

use crate::state::AppState;

/// `GET /drivers`
pub async fn list<RS>(State(state): State<AppState<RS>>) -> Json<Vec<String>>
where
    RS: RoomStore + 'static,
{
    Json(state.engine.registry().list())
}
