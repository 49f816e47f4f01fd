//! Storage Adapters

mod file_storage;

pub use file_storage::{FileGuideStorage, PROTOCOL_FILE};
