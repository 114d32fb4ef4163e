//! # roomctl-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **room control JSON API**
//!   (`/room/{id}/state`, `/room/{id}/health`, `/room/{id}/info`)
//!   plus a liveness probe and a driver listing
//! - Give every request its own [`RequestContext`](roomctl_app::context::RequestContext)
//!   bounded by the configured timeout
//! - Map engine results into HTTP responses: a partial failure keeps the full
//!   body but answers with a non-2xx status
//!
//! ## Dependency rule
//! Depends on `roomctl-app` (for the engine and port traits) and
//! `roomctl-domain` (for the types serialized on the wire). Never leaks axum
//! types into the domain.

pub mod api;
mod error;
pub mod router;
pub mod state;

pub use error::ApiError;
