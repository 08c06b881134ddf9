//! Error types for awsflow
//!
//! One variant per user-facing failure kind. SDK errors that carry no extra
//! meaning at this layer pass through transparently.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for awsflow operations
#[derive(Error, Debug)]
pub enum FlowError {
    /// Mismatched container shapes, list lengths, or a wildcard inside an
    /// explicit list of paths. Raised before any SDK call is made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing environment variable, a literal credential string passed
    /// where a variable name was expected, or a malformed credential string.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target bucket does not exist (404 from the existence check)
    #[error("404 Bucket '{0}' does not exist")]
    BucketNotFound(String),

    /// Expired or invalid credentials (400 from the existence check or
    /// during a transfer)
    #[error("400 The credentials were expired or incorrect: {0}")]
    CredentialsInvalid(String),

    /// Upload rejected by the service, wrapping the SDK's own message
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// I/O error on the local filesystem
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other S3 error, propagated unchanged
    #[error(transparent)]
    S3(#[from] aws_sdk_s3::Error),

    /// Credential resolution failure from the AWS provider chain
    #[error(transparent)]
    Credentials(#[from] aws_credential_types::provider::error::CredentialsError),

    /// Any warehouse error, propagated unchanged
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

impl FlowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FlowError>;
