use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::RwLock;

/// Namespace every uploaded image lives under.
pub const UPLOAD_PREFIX: &str = "uploads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object name: {0:?}")]
    InvalidName(String),
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object storage error: {0}")]
    Remote(String),
}

/// StorageService
///
/// Contract for the image store. Names are bare file names (`<uuid>.<ext>`); each
/// backend places them in the `uploads/` namespace.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Makes sure the backing location exists. Safe to call repeatedly at startup.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Removes a stored file. Removing a name that was never written is an error for
    /// the local and mock backends; callers treat any failure as non-fatal.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}

/// sanitize_key
///
/// Drops directory navigation segments (`..`, `.`) and empty segments from a name.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Reduces `name` to a single safe path segment.
fn file_name(name: &str) -> Result<String, StorageError> {
    let sanitized = sanitize_key(name);
    if sanitized.is_empty() || sanitized.contains('/') || sanitized.contains('\\') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

// --- Local Disk ---

/// LocalStorage
///
/// Keeps images on disk under `<root>/`. Used in `Env::Local`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(file_name(name)?))
    }
}

#[async_trait]
impl StorageService for LocalStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Image written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::remove_file(&path).await?;
        tracing::debug!(path = %path.display(), "Image removed");
        Ok(())
    }
}

// --- S3-compatible ---

/// S3StorageClient
///
/// Object storage through the AWS SDK. `force_path_style(true)` keeps it compatible
/// with MinIO and other S3-compatible gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub fn new(endpoint: &str, region: &str, access_key: &str, secret_key: &str, bucket: &str) -> Self {
        let credentials = s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }

    fn object_key(name: &str) -> Result<String, StorageError> {
        Ok(format!("{UPLOAD_PREFIX}/{}", file_name(name)?))
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// CreateBucket is idempotent from our point of view: "already owned" is not an error worth failing on.
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        if let Err(e) = self.client.create_bucket().bucket(&self.bucket_name).send().await {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "Bucket not created");
        }
        Ok(())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let key = Self::object_key(name)?;
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let key = Self::object_key(name)?;
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;
        Ok(())
    }
}

// --- Mock ---

/// MockStorageService
///
/// In-memory store for tests. A failing instance rejects every write and delete.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.files.read().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Remote("mock storage failure".to_string()));
        }
        let name = file_name(name)?;
        self.files.write().await.insert(name, bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Remote("mock storage failure".to_string()));
        }
        match self.files.write().await.remove(name) {
            Some(_) => Ok(()),
            None => Err(StorageError::Remote(format!("no such object: {name}"))),
        }
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_key_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("./a//b"), "a/b");
    }

    #[test]
    fn file_name_rejects_nested_paths() {
        assert!(file_name("a/b.png").is_err());
        assert!(file_name("..").is_err());
        assert_eq!(file_name("x.png").unwrap(), "x.png");
    }
}
