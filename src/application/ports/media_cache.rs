//! Media Cache Port - 生成媒体的键值缓存
//!
//! 生成的配图与朗读音频都写入这里，按调用方给出的 key 读回。
//! 后写覆盖，无淘汰、无过期、无容量限制。

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 反馈朗读的固定缓存 key
pub const FEEDBACK_CACHE_KEY: &str = "feedback";

/// Media Cache Port
///
/// key 原样使用，不做大小写或空白归一化
#[async_trait]
pub trait MediaCachePort: Send + Sync {
    /// 读取缓存，未命中返回 `Ok(None)`，从不触发生成
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// 无条件覆盖写入
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), CacheError>;

    /// 检查缓存是否存在
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// 获取缓存统计信息
    async fn stats(&self) -> CacheStats;
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub hit_count: u64,
    pub miss_count: u64,
}

/// Key-Value Store Port
///
/// 缓存的持久化后端：整表读入、整表写出
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    async fn load(&self) -> Result<HashMap<String, Vec<u8>>, CacheError>;

    async fn save(&self, entries: &HashMap<String, Vec<u8>>) -> Result<(), CacheError>;
}
