use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

use super::error::StorageError;
use super::id::ObjectId;
use super::traits::{Bucket, BoxReader, ObjectStore, StoredObject};

/// Filesystem-backed id-addressed object store.
///
/// Objects are stored per bucket in a sharded directory layout:
/// `{base_path}/{bucket}/{first 2 hex chars}/{remaining 30 hex chars}`
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a given object id.
    fn object_path(&self, bucket: Bucket, id: &ObjectId) -> PathBuf {
        self.base_path
            .join(bucket.dir_name())
            .join(id.shard_prefix())
            .join(id.shard_suffix())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Move a fully written temp file into its final sharded location.
    async fn commit_temp(
        &self,
        temp_path: &PathBuf,
        bucket: Bucket,
        id: &ObjectId,
    ) -> Result<(), StorageError> {
        let object_path = self.object_path(bucket, id);

        if let Some(parent) = object_path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                let _ = fs::remove_file(temp_path).await;
                return Err(e.into());
            }
        }

        if let Err(e) = fs::rename(temp_path, &object_path).await {
            let _ = fs::remove_file(temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, bucket: Bucket, data: &[u8]) -> Result<StoredObject, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let id = ObjectId::generate();
        let temp_path = self.temp_path();

        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        self.commit_temp(&temp_path, bucket, &id).await?;

        Ok(StoredObject {
            id,
            size: data.len() as u64,
        })
    }

    async fn put_stream(
        &self,
        bucket: Bucket,
        mut reader: BoxReader,
    ) -> Result<StoredObject, StorageError> {
        let id = ObjectId::generate();
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            if let Err(e) = tokio::io::AsyncWriteExt::write_all(&mut temp_file, &buf[..n]).await {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        tokio::io::AsyncWriteExt::flush(&mut temp_file).await?;
        drop(temp_file);

        self.commit_temp(&temp_path, bucket, &id).await?;

        Ok(StoredObject {
            id,
            size: total_bytes,
        })
    }

    async fn get_stream(&self, bucket: Bucket, id: &ObjectId) -> Result<BoxReader, StorageError> {
        let object_path = self.object_path(bucket, id);
        match fs::File::open(&object_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{bucket}/{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: Bucket, id: &ObjectId) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, id);
        Ok(fs::try_exists(&object_path).await?)
    }

    async fn delete(&self, bucket: Bucket, id: &ObjectId) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, id);
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, bucket: Bucket, id: &ObjectId) -> Result<u64, StorageError> {
        let object_path = self.object_path(bucket, id);
        match fs::metadata(&object_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{bucket}/{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
