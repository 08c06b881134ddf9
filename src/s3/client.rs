//! Bucket handle and object transfer operations
//!
//! Every operation resolves its own session, performs one SDK call per
//! requested item, and maps HTTP-style SDK failures onto [`FlowError`]
//! kinds. No retries happen at this layer; transient failures propagate
//! immediately.

use std::path::{Path, PathBuf};

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;

use super::glob::{filter_keys, listing_prefix};
use super::types::{
    validate_no_wildcards, validate_transfer_pair, ObjectInfo, PathSpec, TransferConfig,
};
use crate::error::{FlowError, Result};
use crate::session::{create_session, SessionConfig};

/// Extract the HTTP status code from an SDK error, if a response was received
fn http_status<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|r| r.status().as_u16())
}

/// An existence-checked handle to one S3 bucket
pub struct BucketHandle {
    client: Client,
    bucket: String,
}

impl BucketHandle {
    /// Resolve a session and validate that the bucket is reachable.
    ///
    /// A 404 from the existence check means the bucket does not exist; a 400
    /// means the credentials are expired or invalid. Anything else
    /// propagates unchanged.
    pub async fn open(bucket: &str, session: &SessionConfig) -> Result<Self> {
        let sdk_config = create_session(session).await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if session.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        if let Err(e) = client.head_bucket().bucket(bucket).send().await {
            return Err(match http_status(&e) {
                Some(404) => FlowError::BucketNotFound(bucket.to_string()),
                Some(400) => {
                    FlowError::CredentialsInvalid(format!("{}", DisplayErrorContext(&e)))
                }
                _ => aws_sdk_s3::Error::from(e).into(),
            });
        }

        tracing::debug!("Opened bucket '{}'", bucket);
        Ok(Self {
            client,
            bucket: bucket.to_string(),
        })
    }

    /// Bucket name this handle points at
    pub fn name(&self) -> &str {
        &self.bucket
    }

    /// List every object under a prefix, following pagination to the end
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(aws_sdk_s3::Error::from)?;
            for obj in page.contents() {
                objects.push(ObjectInfo {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().unwrap_or(0) as u64,
                    last_modified: obj.last_modified().map(|d| {
                        chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                            .unwrap_or_default()
                    }),
                });
            }
        }

        Ok(objects)
    }

    /// Expand a single-`*` pattern against the bucket's keys
    pub async fn expand_wildcard(&self, pattern: &str) -> Result<Vec<String>> {
        let prefix = listing_prefix(pattern);
        let objects = self.list_objects(&prefix).await?;
        let keys = filter_keys(objects.iter().map(|o| o.key.as_str()), pattern);
        tracing::debug!(
            "Wildcard '{}' matched {} key(s) under '{}'",
            pattern,
            keys.len(),
            prefix
        );
        Ok(keys)
    }

    /// Download one or many objects.
    ///
    /// A single source path may contain a `*`; it expands against the
    /// bucket and the single local destination is treated as a directory,
    /// with each matched key's final path segment as the filename. The
    /// first failing item aborts the remaining loop; already-downloaded
    /// files are not removed.
    pub async fn download(
        &self,
        s3_paths: impl Into<PathSpec>,
        local_paths: impl Into<PathSpec>,
        transfer: &TransferConfig,
    ) -> Result<()> {
        let s3_paths = s3_paths.into();
        let local_paths = local_paths.into();
        validate_transfer_pair(&s3_paths, &local_paths)?;

        let pairs: Vec<(String, PathBuf)> = match (s3_paths, local_paths) {
            (PathSpec::One(src), PathSpec::One(dst)) if src.contains('*') => {
                let dir = PathBuf::from(dst);
                self.expand_wildcard(&src)
                    .await?
                    .into_iter()
                    .map(|key| {
                        let file_name = key.rsplit('/').next().unwrap_or_default().to_string();
                        (key, dir.join(file_name))
                    })
                    .collect()
            }
            (PathSpec::One(src), PathSpec::One(dst)) => vec![(src, PathBuf::from(dst))],
            (PathSpec::Many(srcs), PathSpec::Many(dsts)) => srcs
                .into_iter()
                .zip(dsts.into_iter().map(PathBuf::from))
                .collect(),
            // Shape mismatches are rejected by the validator above
            _ => {
                return Err(FlowError::InvalidArgument(
                    "Source and destination paths must both be a single path or both be lists"
                        .to_string(),
                ))
            }
        };

        for (key, local) in &pairs {
            self.download_one(key, local, transfer).await?;
        }

        tracing::info!("Downloaded {} object(s) from '{}'", pairs.len(), self.bucket);
        Ok(())
    }

    async fn download_one(&self, key: &str, local: &Path, transfer: &TransferConfig) -> Result<()> {
        if let Some(parent) = local.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FlowError::io(parent, e))?;
            }
        }

        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.transfer_err(e))?;
        let size = head.content_length().unwrap_or(0) as u64;

        if size >= transfer.multipart_threshold && transfer.multipart_chunksize > 0 {
            self.download_ranged(key, local, size, transfer.multipart_chunksize)
                .await
        } else {
            self.download_whole(key, local).await
        }
    }

    async fn download_whole(&self, key: &str, local: &Path) -> Result<()> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.transfer_err(e))?;

        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(|e| FlowError::io(local, e))?;
        let mut body = resp.body.into_async_read();
        tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| FlowError::io(local, e))?;

        Ok(())
    }

    /// Fetch a large object as sequential ranged GETs of chunk_size bytes
    async fn download_ranged(
        &self,
        key: &str,
        local: &Path,
        size: u64,
        chunk_size: u64,
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(|e| FlowError::io(local, e))?;

        let mut offset = 0u64;
        while offset < size {
            let end = (offset + chunk_size).min(size) - 1;
            let resp = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .range(format!("bytes={offset}-{end}"))
                .send()
                .await
                .map_err(|e| self.transfer_err(e))?;

            let data = resp
                .body
                .collect()
                .await
                .map_err(|e| FlowError::io(local, std::io::Error::other(e)))?;
            file.write_all(&data.into_bytes())
                .await
                .map_err(|e| FlowError::io(local, e))?;

            offset = end + 1;
        }

        Ok(())
    }

    /// Upload one or many local files.
    ///
    /// A single local path may contain a `*`; it expands against the local
    /// filesystem (directories filtered out) and each matched file's
    /// basename is appended to the single destination prefix.
    pub async fn upload(
        &self,
        local_paths: impl Into<PathSpec>,
        s3_paths: impl Into<PathSpec>,
        transfer: &TransferConfig,
    ) -> Result<()> {
        let local_paths = local_paths.into();
        let s3_paths = s3_paths.into();
        validate_transfer_pair(&s3_paths, &local_paths)?;

        let pairs: Vec<(PathBuf, String)> = match (local_paths, s3_paths) {
            (PathSpec::One(src), PathSpec::One(dst)) if src.contains('*') => {
                let mut pairs = Vec::new();
                let entries = ::glob::glob(&src).map_err(|e| {
                    FlowError::InvalidArgument(format!("Invalid wildcard pattern '{src}': {e}"))
                })?;
                for entry in entries {
                    let path = entry
                        .map_err(|e| FlowError::io(e.path().to_path_buf(), e.into_error()))?;
                    if !path.is_file() {
                        continue;
                    }
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    pairs.push((path, format!("{dst}{file_name}")));
                }
                pairs
            }
            (PathSpec::One(src), PathSpec::One(dst)) => vec![(PathBuf::from(src), dst)],
            (PathSpec::Many(srcs), PathSpec::Many(dsts)) => srcs
                .into_iter()
                .map(PathBuf::from)
                .zip(dsts)
                .collect(),
            _ => {
                return Err(FlowError::InvalidArgument(
                    "Source and destination paths must both be a single path or both be lists"
                        .to_string(),
                ))
            }
        };

        for (local, key) in &pairs {
            self.upload_one(local, key, transfer).await?;
        }

        tracing::info!("Uploaded {} file(s) to '{}'", pairs.len(), self.bucket);
        Ok(())
    }

    async fn upload_one(&self, local: &Path, key: &str, transfer: &TransferConfig) -> Result<()> {
        let metadata = tokio::fs::metadata(local)
            .await
            .map_err(|e| FlowError::io(local, e))?;
        let size = metadata.len();

        if size >= transfer.multipart_threshold && size > 0 {
            self.multipart_upload(local, key, transfer.multipart_chunksize)
                .await
        } else {
            let body = ByteStream::from_path(local)
                .await
                .map_err(|e| FlowError::io(local, std::io::Error::other(e)))?;
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| FlowError::UploadFailed(format!("{}", DisplayErrorContext(&e))))?;
            Ok(())
        }
    }

    /// Multipart upload for files at or above the threshold
    async fn multipart_upload(&self, local: &Path, key: &str, chunk_size: u64) -> Result<()> {
        let create = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| FlowError::UploadFailed(format!("{}", DisplayErrorContext(&e))))?;

        let upload_id = create
            .upload_id()
            .ok_or_else(|| FlowError::UploadFailed("Service returned no upload id".to_string()))?
            .to_string();

        let data = tokio::fs::read(local)
            .await
            .map_err(|e| FlowError::io(local, e))?;

        let chunk = chunk_size.max(1) as usize;
        let mut parts = Vec::new();
        let mut offset = 0usize;
        let mut part_number = 1i32;

        while offset < data.len() {
            let end = (offset + chunk).min(data.len());
            let body = ByteStream::from(data[offset..end].to_vec());

            let part = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| FlowError::UploadFailed(format!("{}", DisplayErrorContext(&e))))?;

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(part.e_tag().unwrap_or_default())
                    .build(),
            );

            offset = end;
            part_number += 1;
        }

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| FlowError::UploadFailed(format!("{}", DisplayErrorContext(&e))))?;

        Ok(())
    }

    /// Delete one or many objects, returning the keys the service reports
    /// deleted.
    ///
    /// A single wildcarded path expands against the bucket first; zero
    /// matches return an empty Vec without issuing a delete call.
    pub async fn delete(&self, s3_paths: impl Into<PathSpec>) -> Result<Vec<String>> {
        let spec = s3_paths.into();
        validate_no_wildcards(&spec)?;

        let keys: Vec<String> = match spec {
            PathSpec::One(path) if path.contains('*') => {
                let keys = self.expand_wildcard(&path).await?;
                if keys.is_empty() {
                    return Ok(Vec::new());
                }
                keys
            }
            PathSpec::One(path) => vec![path],
            PathSpec::Many(paths) => paths,
        };

        let mut objects = Vec::with_capacity(keys.len());
        for key in &keys {
            let object = ObjectIdentifier::builder()
                .key(key)
                .build()
                .map_err(|e| FlowError::InvalidArgument(format!("Invalid object key '{key}': {e}")))?;
            objects.push(object);
        }
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| FlowError::InvalidArgument(e.to_string()))?;

        let resp = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let deleted: Vec<String> = resp
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(String::from))
            .collect();
        tracing::info!("Deleted {} object(s) from '{}'", deleted.len(), self.bucket);
        Ok(deleted)
    }

    /// Map a transfer-time SDK failure: 400 means bad credentials, anything
    /// else passes through unchanged
    fn transfer_err<E>(&self, err: SdkError<E>) -> FlowError
    where
        E: std::error::Error + Send + Sync + 'static,
        aws_sdk_s3::Error: From<SdkError<E>>,
    {
        match http_status(&err) {
            Some(400) => FlowError::CredentialsInvalid(format!("{}", DisplayErrorContext(&err))),
            _ => aws_sdk_s3::Error::from(err).into(),
        }
    }
}
