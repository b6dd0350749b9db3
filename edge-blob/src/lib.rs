//! # edge-blob
//!
//! Object storage for configuration snapshots. The [`ObjectStore`] trait
//! covers the handful of bucket/object calls the provisioning workflow
//! needs; [`VersionStore`] layers generation-based history on top of a
//! bucket with native object versioning.
//!
//! Backends:
//! - [`GcsStore`] talks to the Cloud Storage JSON API
//! - [`MemoryStore`] keeps everything in process (tests, local runs)

mod error;
mod gcs;
mod memory;
mod store;
mod version;

pub use error::{BlobError, BlobResult};
pub use gcs::GcsStore;
pub use memory::MemoryStore;
pub use store::{ObjectGeneration, ObjectStore, PutResult};
pub use version::{StagingVersion, VersionStore, NO_DESCRIPTION};
