//! HTTP surface: routing, handlers and error responses.

pub mod error;
pub mod handlers;
pub mod routes;
