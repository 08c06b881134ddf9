//! Integration tests for the S3 façade using MinIO via testcontainers
//!
//! These tests require Docker to be running and use the testcontainers
//! crate to spin up a MinIO instance for realistic S3 testing.
//!
//! Run with: cargo test --test s3_integration
//!
//! Note: Tests are conditionally skipped if Docker is not available.

use std::path::Path;
use std::time::Duration;

use awsflow::error::FlowError;
use awsflow::{create_session, BucketHandle, PathSpec, SessionConfig, TransferConfig};
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::minio::MinIO;

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Test helper to check if Docker is available
fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("info")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Helper to get MinIO endpoint URL from container
async fn minio_endpoint(container: &ContainerAsync<MinIO>) -> String {
    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");
    let port = container
        .get_host_port_ipv4(9000)
        .await
        .expect("Failed to get MinIO port");
    format!("http://{}:{}", host, port)
}

async fn start_minio() -> (ContainerAsync<MinIO>, SessionConfig) {
    init_tracing();
    let container = MinIO::default()
        .with_env_var("MINIO_ROOT_USER", MINIO_ACCESS_KEY)
        .with_env_var("MINIO_ROOT_PASSWORD", MINIO_SECRET_KEY)
        .start()
        .await
        .expect("Failed to start MinIO container");

    let endpoint = minio_endpoint(&container).await;

    // Wait for MinIO to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;

    let session = SessionConfig {
        profile: None,
        region: Some("us-east-1".to_string()),
        endpoint_url: Some(endpoint),
        force_path_style: true,
        access_key_id: Some(MINIO_ACCESS_KEY.to_string()),
        secret_access_key: Some(MINIO_SECRET_KEY.to_string()),
    };
    (container, session)
}

/// Create a bucket with the raw SDK client (bucket creation is not part of
/// the façade surface)
async fn create_bucket(session: &SessionConfig, bucket: &str) {
    let sdk_config = create_session(session).await;
    let config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();
    let client = aws_sdk_s3::Client::from_conf(config);
    client
        .create_bucket()
        .bucket(bucket)
        .send()
        .await
        .expect("Failed to create bucket");
}

fn write_file(path: &Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("Failed to write test file");
}

#[tokio::test]
async fn test_open_missing_bucket_is_not_found() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;

    let result = BucketHandle::open("no-such-bucket", &session).await;
    assert!(matches!(result, Err(FlowError::BucketNotFound(_))));
}

#[tokio::test]
async fn test_upload_and_download_single_file() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "data-bucket").await;

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("hello.txt");
    write_file(&src, b"Hello, MinIO! This is test data.");

    let bucket = BucketHandle::open("data-bucket", &session)
        .await
        .expect("Failed to open bucket");
    let transfer = TransferConfig::default();

    bucket
        .upload(src.to_string_lossy().as_ref(), "incoming/hello.txt", &transfer)
        .await
        .expect("Failed to upload");

    let dst = dir.path().join("roundtrip.txt");
    bucket
        .download(
            "incoming/hello.txt",
            dst.to_string_lossy().as_ref(),
            &transfer,
        )
        .await
        .expect("Failed to download");

    let downloaded = std::fs::read(&dst).unwrap();
    assert_eq!(downloaded, b"Hello, MinIO! This is test data.");
}

#[tokio::test]
async fn test_multipart_threshold_upload_roundtrip() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "big-bucket").await;

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("big.bin");
    // Three chunks: two full and one partial
    let payload: Vec<u8> = (0..2_500_000u32).map(|i| (i % 251) as u8).collect();
    write_file(&src, &payload);

    let bucket = BucketHandle::open("big-bucket", &session).await.unwrap();
    let transfer = TransferConfig {
        multipart_threshold: 1024 * 1024,
        // MinIO enforces the S3 5 MiB minimum part size for all but the
        // last part, so stay above it
        multipart_chunksize: 5 * 1024 * 1024,
    };

    bucket
        .upload(src.to_string_lossy().as_ref(), "blobs/big.bin", &transfer)
        .await
        .expect("Failed multipart upload");

    let dst = dir.path().join("big-roundtrip.bin");
    bucket
        .download("blobs/big.bin", dst.to_string_lossy().as_ref(), &transfer)
        .await
        .expect("Failed ranged download");

    let downloaded = std::fs::read(&dst).unwrap();
    assert_eq!(downloaded, payload);
}

#[tokio::test]
async fn test_upload_local_wildcard_expansion() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "wild-bucket").await;

    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), b"a");
    write_file(&dir.path().join("b.csv"), b"b");
    write_file(&dir.path().join("readme.txt"), b"not csv");
    // Directories must be filtered out of local expansion
    std::fs::create_dir(dir.path().join("sub.csv")).unwrap();

    let bucket = BucketHandle::open("wild-bucket", &session).await.unwrap();
    let pattern = format!("{}/*.csv", dir.path().to_string_lossy());

    bucket
        .upload(pattern.as_str(), "data/", &TransferConfig::default())
        .await
        .expect("Failed wildcard upload");

    let mut keys: Vec<String> = bucket
        .list_objects("data/")
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["data/a.csv", "data/b.csv"]);
}

#[tokio::test]
async fn test_download_wildcard_fans_out_to_directory() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "fan-bucket").await;

    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), b"aaa");
    write_file(&dir.path().join("b.csv"), b"bbb");

    let bucket = BucketHandle::open("fan-bucket", &session).await.unwrap();
    let transfer = TransferConfig::default();
    bucket
        .upload(
            PathSpec::from(vec![
                dir.path().join("a.csv").to_string_lossy().into_owned(),
                dir.path().join("b.csv").to_string_lossy().into_owned(),
            ]),
            PathSpec::from(vec!["data/a.csv".to_string(), "data/b.csv".to_string()]),
            &transfer,
        )
        .await
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    bucket
        .download(
            "data/*.csv",
            out.path().to_string_lossy().as_ref(),
            &transfer,
        )
        .await
        .expect("Failed wildcard download");

    assert_eq!(std::fs::read(out.path().join("a.csv")).unwrap(), b"aaa");
    assert_eq!(std::fs::read(out.path().join("b.csv")).unwrap(), b"bbb");
}

#[tokio::test]
async fn test_delete_with_wildcard() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "del-bucket").await;

    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), b"a");
    write_file(&dir.path().join("keep.txt"), b"keep");

    let bucket = BucketHandle::open("del-bucket", &session).await.unwrap();
    let transfer = TransferConfig::default();
    bucket
        .upload(
            PathSpec::from(vec![
                dir.path().join("a.csv").to_string_lossy().into_owned(),
                dir.path().join("keep.txt").to_string_lossy().into_owned(),
            ]),
            PathSpec::from(vec!["data/a.csv".to_string(), "data/keep.txt".to_string()]),
            &transfer,
        )
        .await
        .unwrap();

    let deleted = bucket.delete("data/*.csv").await.expect("Failed delete");
    assert_eq!(deleted, vec!["data/a.csv"]);

    let remaining: Vec<String> = bucket
        .list_objects("data/")
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(remaining, vec!["data/keep.txt"]);
}

#[tokio::test]
async fn test_delete_wildcard_with_no_matches_returns_empty() {
    if !docker_available() {
        eprintln!("Skipping test: Docker not available");
        return;
    }

    let (_container, session) = start_minio().await;
    create_bucket(&session, "empty-bucket").await;

    let bucket = BucketHandle::open("empty-bucket", &session).await.unwrap();
    let deleted = bucket.delete("data/*.parquet").await.unwrap();
    assert!(deleted.is_empty());
}
