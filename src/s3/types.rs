//! S3 façade data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Default multipart threshold and chunk size: 8 MiB
const DEFAULT_MULTIPART_BYTES: u64 = 8 * 1024 * 1024;

/// One key/path or an explicit list of them.
///
/// Transfer and delete operations accept either a single path (which may
/// contain a `*` wildcard) or a list of concrete paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    One(String),
    Many(Vec<String>),
}

impl PathSpec {
    /// Number of paths carried
    pub fn len(&self) -> usize {
        match self {
            PathSpec::One(_) => 1,
            PathSpec::Many(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_list(&self) -> bool {
        matches!(self, PathSpec::Many(_))
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            PathSpec::One(path) => std::slice::from_ref(path).iter(),
            PathSpec::Many(paths) => paths.iter(),
        }
        .map(String::as_str)
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::One(path.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        PathSpec::One(path)
    }
}

impl From<Vec<String>> for PathSpec {
    fn from(paths: Vec<String>) -> Self {
        PathSpec::Many(paths)
    }
}

impl From<&[&str]> for PathSpec {
    fn from(paths: &[&str]) -> Self {
        PathSpec::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Multipart transfer tuning, mirroring the service defaults
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Object/file size at which transfers switch to multipart
    pub multipart_threshold: u64,
    /// Size of each multipart chunk in bytes
    pub multipart_chunksize: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold: DEFAULT_MULTIPART_BYTES,
            multipart_chunksize: DEFAULT_MULTIPART_BYTES,
        }
    }
}

/// A listed S3 object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectInfo {
    /// Directory placeholders are zero-byte keys ending in `/`
    pub fn is_placeholder(&self) -> bool {
        self.key.ends_with('/')
    }
}

/// Validate a (source, destination) pair for download/upload.
///
/// Both sides must be the same shape; lists must be equal length and free
/// of wildcards. Runs before any SDK call.
pub(crate) fn validate_transfer_pair(src: &PathSpec, dst: &PathSpec) -> Result<()> {
    if src.is_list() != dst.is_list() {
        return Err(FlowError::InvalidArgument(
            "Source and destination paths must both be a single path or both be lists"
                .to_string(),
        ));
    }
    if src.is_list() {
        validate_no_wildcards(src)?;
        validate_no_wildcards(dst)?;
        if src.len() != dst.len() {
            return Err(FlowError::InvalidArgument(format!(
                "Source and destination lists must have the same number of elements \
                 (got {} and {})",
                src.len(),
                dst.len()
            )));
        }
    }
    Ok(())
}

/// Reject `*` inside an explicit list of paths
pub(crate) fn validate_no_wildcards(spec: &PathSpec) -> Result<()> {
    if spec.is_list() {
        for path in spec.iter() {
            if path.contains('*') {
                return Err(FlowError::InvalidArgument(
                    "Wildcards (*) are not permitted within a list of filepaths".to_string(),
                ));
            }
        }
    }
    Ok(())
}
