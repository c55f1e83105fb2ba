mod error;
mod id;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemObjectStore;
pub use id::ObjectId;
pub use traits::{Bucket, BoxReader, ObjectStore, StoredObject};
