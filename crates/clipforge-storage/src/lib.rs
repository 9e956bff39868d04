//! S3-compatible blob store client.
//!
//! Works against any S3 API endpoint (Cloudflare R2, MinIO, AWS). The store
//! is an optional capability: when its configuration is absent the service
//! runs local-only, and call sites branch once on presence at construction
//! time rather than wrapping every operation.

pub mod client;
pub mod error;

pub use client::{BlobStore, BlobStoreConfig};
pub use error::{StorageError, StorageResult};
