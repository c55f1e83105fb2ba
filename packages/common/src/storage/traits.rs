use std::fmt;
use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::id::ObjectId;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Namespace for stored objects. Each bucket has its own id space on disk,
/// though ids are globally unique anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Document payloads (the files behind catalog records).
    Documents,
    /// Member avatar images.
    MemberImages,
}

impl Bucket {
    /// Directory name for this bucket in filesystem-backed stores.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::MemberImages => "member-images",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Outcome of a successful upload: the generated id and the byte count
/// actually written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredObject {
    pub id: ObjectId,
    pub size: u64,
}

/// Id-addressed binary object storage.
///
/// Every upload is stored under a freshly generated id; the caller records
/// that id and uses it for all later reads and deletes. Identical payloads
/// uploaded twice yield two independent objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes and return the generated id with the written size.
    async fn put(&self, bucket: Bucket, data: &[u8]) -> Result<StoredObject, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(bucket, reader).await
    }

    /// Store data from an async reader and return the generated id with the
    /// written size.
    async fn put_stream(
        &self,
        bucket: Bucket,
        reader: BoxReader,
    ) -> Result<StoredObject, StorageError>;

    /// Retrieve all bytes for an object by its id.
    async fn get(&self, bucket: Bucket, id: &ObjectId) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(bucket, id).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an object as a streaming async reader.
    async fn get_stream(&self, bucket: Bucket, id: &ObjectId) -> Result<BoxReader, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: Bucket, id: &ObjectId) -> Result<bool, StorageError>;

    /// Delete an object by its id.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, bucket: Bucket, id: &ObjectId) -> Result<bool, StorageError>;

    /// Get the size of an object in bytes.
    async fn size(&self, bucket: Bucket, id: &ObjectId) -> Result<u64, StorageError>;
}
