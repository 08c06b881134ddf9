//! Object store façade
//!
//! This module wraps AWS S3 with validated one-or-many transfer operations:
//! - [`client::BucketHandle`] - existence-checked bucket handle with
//!   download/upload/delete
//! - [`glob`] - the single-`*` wildcard matcher for object keys
//! - [`types`] - PathSpec, TransferConfig and listing types

pub mod client;
pub mod glob;
pub mod types;

// Re-export commonly used types
pub use client::BucketHandle;
pub use types::{ObjectInfo, PathSpec, TransferConfig};
