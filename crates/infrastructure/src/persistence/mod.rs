//! Durable key-value storage

mod file_storage;

pub use file_storage::{FileStorage, StorageError};
