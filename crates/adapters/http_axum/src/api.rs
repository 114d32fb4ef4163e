//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod drivers;
#[allow(clippy::missing_errors_doc)]
pub mod rooms;

use axum::Router;
use axum::routing::get;

use roomctl_app::ports::RoomStore;

use crate::state::AppState;

/// Build the API routes.
pub fn routes<RS>() -> Router<AppState<RS>>
where
    RS: RoomStore + 'static,
{
    Router::new()
        .route("/drivers", get(drivers::list::<RS>))
        .route(
            "/room/{id}/state",
            get(rooms::get_state::<RS>).put(rooms::set_state::<RS>),
        )
        .route("/room/{id}/health", get(rooms::health::<RS>))
        .route("/room/{id}/info", get(rooms::info::<RS>))
}
