//! Sled 键值存储

mod media_store;

pub use media_store::{SledMediaStore, SledStoreConfig};
