//! HTTP server answering map requests from an airmap [`Catalog`](airmap::Catalog).
//!
//! Routes:
//!
//! - `POST /api/maps/generate` takes a [`MapRequest`](airmap::MapRequest) and returns a
//!   [`MapResponse`](airmap::MapResponse), or an error body with status `400`, `404` or `500`.
//! - `GET /health` returns `ok`.
//! - In production every other path serves the client bundle.

pub mod api;
pub mod core;

pub use crate::api::routes::router;
pub use crate::core::config::ServerConfig;
pub use crate::core::state::AppState;
