//! Axum router assembly.

use axum::Router;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use roomctl_app::ports::RoomStore;

use crate::state::AppState;

/// Header carrying the id that ties a request to its log lines.
pub const REQUEST_ID: &str = "x-request-id";

/// Build the top-level axum [`Router`].
///
/// Every request is stamped with an `x-request-id` (kept when the client
/// sent one) and traced by a [`TraceLayer`] whose span carries that id.
pub fn build<RS>(state: AppState<RS>) -> Router
where
    RS: RoomStore + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            tracing::debug_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
            )
        }))
        .layer(middleware::from_fn(stamp_request_id))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn stamp_request_id(mut request: Request, next: Next) -> Response {
    let id = match request.headers().get(REQUEST_ID) {
        Some(id) => id.clone(),
        None => {
            let id = HeaderValue::try_from(uuid::Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request.headers_mut().insert(REQUEST_ID, id.clone());
            id
        }
    };
    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID, id);
    response
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use roomctl_adapter_virtual::{DISPLAY, DSP, SWITCHER, register_all};
    use roomctl_app::engine::Engine;
    use roomctl_app::registry::DriverRegistry;
    use roomctl_domain::error::{NotFoundError, RoomCtlError};
    use roomctl_domain::id::{DeviceId, RoomId};
    use roomctl_domain::room::{DeviceConfig, MUTE_PORT, RoomConfig, VOLUME_PORT};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    struct StubRooms(HashMap<RoomId, RoomConfig>);

    impl RoomStore for StubRooms {
        async fn room_config(&self, id: &RoomId) -> Result<RoomConfig, RoomCtlError> {
            self.0.get(id).cloned().ok_or_else(|| {
                NotFoundError {
                    entity: "Room",
                    id: id.to_string(),
                }
                .into()
            })
        }
    }

    fn device(id: &str) -> DeviceId {
        DeviceId::new(id).unwrap()
    }

    fn test_app() -> Router {
        let registry = DriverRegistry::new();
        register_all(&registry).unwrap();

        let mut rooms = HashMap::new();
        let conference = RoomId::new("ITB-1101").unwrap();
        rooms.insert(
            conference.clone(),
            RoomConfig::builder(conference)
                .device(device("D1"), DeviceConfig::new("10.0.0.10", DISPLAY))
                .device(device("SW1"), DeviceConfig::new("10.0.0.20", SWITCHER))
                .device(
                    device("DSP1"),
                    DeviceConfig::new("10.0.0.30", DSP)
                        .with_port("mics", VOLUME_PORT)
                        .with_port("mics", MUTE_PORT),
                )
                .build()
                .unwrap(),
        );
        let lobby = RoomId::new("ITB-LOBBY").unwrap();
        rooms.insert(
            lobby.clone(),
            RoomConfig::builder(lobby)
                .device(device("D1"), DeviceConfig::new("lobby.invalid", DISPLAY))
                .device(device("D2"), DeviceConfig::new("10.0.0.40", DISPLAY))
                .build()
                .unwrap(),
        );

        let state = AppState::new(
            Engine::new(registry.into()),
            StubRooms(rooms),
            Some(Duration::from_secs(5)),
        );
        build(state)
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = axum::http::Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID));
    }

    #[tokio::test]
    async fn should_echo_request_id_when_client_sends_one() {
        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn should_list_registered_drivers() {
        let (status, body) = call(test_app(), Method::GET, "/drivers", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([DISPLAY, DSP, SWITCHER]));
    }

    #[tokio::test]
    async fn should_read_room_state() {
        let (status, body) = call(test_app(), Method::GET, "/room/ITB-1101/state", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("errors").is_none());
        assert_eq!(body["devices"]["D1"]["poweredOn"], json!(false));
        assert_eq!(body["devices"]["SW1"]["inputs"]["2"], json!({"audio": "2", "video": "2"}));
        assert_eq!(body["devices"]["DSP1"]["volumes"]["mics"], json!(50));
    }

    #[tokio::test]
    async fn should_apply_state_and_echo_achieved_fields() {
        let request = json!({
            "devices": {
                "D1": {"poweredOn": true, "inputs": {"": {"audioVideo": "hdmi2"}}},
                "DSP1": {"mutes": {"mics": true}},
            }
        });

        let (status, body) = call(
            test_app(),
            Method::PUT,
            "/room/ITB-1101/state",
            Some(request.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, request);
    }

    #[tokio::test]
    async fn should_return_partial_failure_with_full_body() {
        let request = json!({
            "devices": {
                "D1": {"poweredOn": true},
                "DSP1": {"volumes": {"speakers": 10}},
            }
        });

        let (status, body) = call(test_app(), Method::PUT, "/room/ITB-1101/state", Some(request)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["devices"]["D1"], json!({"poweredOn": true}));
        assert_eq!(
            body["errors"],
            json!([{
                "id": "DSP1",
                "field": "volumes.speakers",
                "value": 10,
                "error": "invalid block",
            }])
        );
    }

    #[tokio::test]
    async fn should_reject_device_outside_the_room() {
        let request = json!({"devices": {"SW9": {"poweredOn": true}}});

        let (status, body) = call(test_app(), Method::PUT, "/room/ITB-1101/state", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "SW9: device is invalid in this room");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_room() {
        let (status, _) = call(test_app(), Method::GET, "/room/ITB-9999/state", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_malformed_room_id() {
        let (status, _) = call(test_app(), Method::GET, "/room/lobby/health", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_report_unreachable_device_in_health() {
        let (status, body) = call(test_app(), Method::GET, "/room/ITB-LOBBY/health", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["devices"]["D2"], json!({"healthy": true}));
        assert_eq!(body["errors"][0]["id"], "D1");
        assert_eq!(body["errors"][0]["field"], "");
        assert_eq!(
            body["errors"][0]["error"],
            "unable to create device: dial lobby.invalid: no such host"
        );
    }

    #[tokio::test]
    async fn should_return_device_info() {
        let (status, body) = call(test_app(), Method::GET, "/room/ITB-1101/info", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["devices"]["D1"]["model"], "VD-1");
        assert_eq!(body["devices"]["SW1"]["model"], "VS-44");
    }
}
