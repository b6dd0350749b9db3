//! # edge-core
//!
//! Shared building blocks for the edge provisioning crates:
//! structured errors that travel inside `anyhow::Error`,
//! a string key/value configuration store, and the `EdgeApp` container
//! that applications hang their settings on.

pub mod app;
pub mod config;
pub mod errors;

pub use app::EdgeApp;
pub use config::{EdgeConfig, EdgeConfigSnapshot};
pub use errors::{EdgeError, ErrorKind};
