//! Local-disk storage for uploaded images.

use std::error::Error as StdError;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{StreamExt, pin_mut, stream};
use slug::slugify;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("uploaded file stream failed")]
    PayloadStream {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("uploaded file is empty")]
    EmptyPayload,
}

/// Where an image belongs; decides the sub-directory and filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Project,
    Blog,
}

impl UploadKind {
    pub fn directory(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::Blog => "blogs",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Blog => "blog",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Path relative to the upload root, e.g. `projects/project-1700000000000-1a2b3c4d.png`.
    pub stored_path: String,
    pub size_bytes: u64,
}

impl StoredUpload {
    pub fn public_path(&self) -> String {
        format!("/uploads/{}", self.stored_path)
    }
}

/// Filesystem-backed upload storage.
#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
    max_file_bytes: u64,
}

impl UploadStorage {
    /// Initialise storage rooted at the provided directory, creating it and the
    /// per-kind sub-directories if necessary.
    pub fn new(root: PathBuf, max_file_bytes: u64) -> Result<Self, std::io::Error> {
        for kind in [UploadKind::Project, UploadKind::Blog] {
            std::fs::create_dir_all(root.join(kind.directory()))?;
        }
        Ok(Self {
            root,
            max_file_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Stream the payload to disk, enforcing the size limit as bytes arrive.
    /// A rejected or failed upload leaves no file behind.
    pub async fn store_stream<S>(
        &self,
        kind: UploadKind,
        original_name: &str,
        stream: S,
    ) -> Result<StoredUpload, UploadStorageError>
    where
        S: futures::Stream<Item = Result<Bytes, UploadStorageError>>,
    {
        let stored_path = build_stored_path(kind, original_name);
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        let written = write_limited(&mut file, stream, self.max_file_bytes).await;
        drop(file);

        match written {
            Ok(size_bytes) => Ok(StoredUpload {
                stored_path,
                size_bytes,
            }),
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&absolute).await {
                    tracing::warn!(
                        target = "infra::uploads",
                        path = %stored_path,
                        error = %cleanup,
                        "failed to remove partial upload"
                    );
                }
                Err(err)
            }
        }
    }

    /// Store a fully-buffered payload.
    pub async fn store(
        &self,
        kind: UploadKind,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredUpload, UploadStorageError> {
        let stream = stream::once(async move { Ok::<_, UploadStorageError>(data) });
        self.store_stream(kind, original_name, stream).await
    }

    pub async fn read(&self, stored_path: &str) -> Result<Bytes, UploadStorageError> {
        let absolute = self.resolve(stored_path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Absolute filesystem path for a stored upload, rejecting traversal.
    pub fn resolve(&self, stored_path: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(stored_path);
        if relative.is_absolute()
            || relative.components().any(|component| {
                matches!(
                    component,
                    Component::ParentDir | Component::Prefix(_) | Component::RootDir
                )
            })
        {
            return Err(UploadStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

fn build_stored_path(kind: UploadKind, original_name: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let unique = Uuid::new_v4().simple().to_string();
    let suffix = &unique[..8];
    let filename = match extension_of(original_name) {
        Some(ext) => format!("{}-{millis}-{suffix}.{ext}", kind.prefix()),
        None => format!("{}-{millis}-{suffix}", kind.prefix()),
    };
    format!("{}/{filename}", kind.directory())
}

fn extension_of(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|value| value.to_str())
        .map(slugify)
        .filter(|value| !value.is_empty())
}

/// Image content types only.
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.trim().to_ascii_lowercase().starts_with("image/"))
}

/// Copies `stream` into `file` and returns the byte count. Any error leaves
/// the file partially written; the caller removes it.
async fn write_limited<S>(
    file: &mut fs::File,
    stream: S,
    limit: u64,
) -> Result<u64, UploadStorageError>
where
    S: futures::Stream<Item = Result<Bytes, UploadStorageError>>,
{
    let mut total_bytes: u64 = 0;

    pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total_bytes = total_bytes.saturating_add(chunk.len() as u64);
        if total_bytes > limit {
            return Err(UploadStorageError::TooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    if total_bytes == 0 {
        return Err(UploadStorageError::EmptyPayload);
    }
    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(limit: u64) -> (tempfile::TempDir, UploadStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().join("uploads"), limit).expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn stores_under_kind_directory() {
        let (_dir, storage) = storage(1024);
        let stored = storage
            .store(UploadKind::Blog, "Cover Photo.PNG", Bytes::from_static(b"\x89PNG"))
            .await
            .expect("stored");

        assert!(stored.stored_path.starts_with("blogs/blog-"));
        assert!(stored.stored_path.ends_with(".png"));
        assert!(stored.public_path().starts_with("/uploads/blogs/"));
        let read_back = storage.read(&stored.stored_path).await.expect("read");
        assert_eq!(read_back.as_ref(), b"\x89PNG");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_and_removed() {
        let (_dir, storage) = storage(4);
        let err = storage
            .store(UploadKind::Project, "big.jpg", Bytes::from_static(b"12345"))
            .await
            .expect_err("too large");
        assert!(matches!(err, UploadStorageError::TooLarge { limit: 4 }));

        let mut entries = fs::read_dir(storage.root().join("projects"))
            .await
            .expect("dir");
        assert!(entries.next_entry().await.expect("entry").is_none());
    }

    async fn is_empty_dir(path: PathBuf) -> bool {
        let mut entries = fs::read_dir(path).await.expect("dir");
        entries.next_entry().await.expect("entry").is_none()
    }

    #[tokio::test]
    async fn failed_stream_leaves_no_partial_file() {
        let (_dir, storage) = storage(1024);
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"first chunk")),
            Err(UploadStorageError::PayloadStream {
                source: "connection reset".into(),
            }),
        ]);
        let err = storage
            .store_stream(UploadKind::Blog, "half.png", chunks)
            .await
            .expect_err("stream failure");
        assert!(matches!(err, UploadStorageError::PayloadStream { .. }));
        assert!(is_empty_dir(storage.root().join("blogs")).await);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let (_dir, storage) = storage(1024);
        let err = storage
            .store(UploadKind::Project, "empty.png", Bytes::new())
            .await
            .expect_err("empty");
        assert!(matches!(err, UploadStorageError::EmptyPayload));
    }

    #[test]
    fn traversal_is_rejected() {
        let (_dir, storage) = storage(1024);
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("projects/a.png").is_ok());
    }

    #[test]
    fn only_images_are_accepted() {
        assert!(is_image(Some("image/png")));
        assert!(is_image(Some("Image/JPEG")));
        assert!(!is_image(Some("application/pdf")));
        assert!(!is_image(None));
    }
}
