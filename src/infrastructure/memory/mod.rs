//! Memory Layer - 内存缓存
//!
//! 基于 DashMap 的媒体缓存，可选持久化

mod media_cache;

pub use media_cache::InMemoryMediaCache;
