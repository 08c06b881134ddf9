//! awsflow - a convenience layer over AWS S3 and Redshift
//!
//! Wraps session/credential creation, object upload/download/delete with
//! single-`*` wildcard matching, and SQL execution with result shaping.
//! Every operation is a thin, validated pass-through to the underlying SDK;
//! credential management and rotation stay the caller's responsibility.

pub mod error;
pub mod redshift;
pub mod s3;
pub mod session;

pub use error::{FlowError, Result};
pub use s3::{BucketHandle, PathSpec, TransferConfig};
pub use session::{create_session, credential_string, SessionConfig};
