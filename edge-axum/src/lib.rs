//! edge-axum: Axum adapter for the edge provisioning services.
//!
//! Wraps an [`edge_core::EdgeApp`] and an Axum router, renders
//! [`edge_core::EdgeError`]s as JSON responses, and installs request
//! tracing with `x-request-id` propagation.

pub mod app;
pub mod rest;
mod error;

pub use app::{axum, AxumApp};
pub use error::EdgeAxumError;
pub use rest::JsonBody;
