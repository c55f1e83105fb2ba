pub mod storage;

pub use storage::{
    Bucket, BoxReader, FilesystemObjectStore, ObjectId, ObjectStore, StorageError, StoredObject,
};
