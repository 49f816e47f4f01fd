//! Sled-based Media Store
//!
//! 媒体缓存的持久化后端。每个条目以 `media:{key}` 存储为 bincode 编码的记录，
//! `save` 用一个批次把整张映射替换进去。

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{CacheError, KeyValueStorePort};

const KEY_PREFIX: &str = "media:";

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/media.sled".to_string(),
        }
    }
}

/// 内部存储记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    data: Vec<u8>,
    size_bytes: u64,
    updated_at: i64,
}

pub struct SledMediaStore {
    db: Db,
}

impl SledMediaStore {
    pub fn new(config: &SledStoreConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path).map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            entries = db.scan_prefix(KEY_PREFIX).count(),
            "SledMediaStore initialized"
        );

        Ok(Self { db })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

#[async_trait]
impl KeyValueStorePort for SledMediaStore {
    async fn load(&self) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        let mut entries = HashMap::new();
        let mut total_size_bytes = 0u64;
        let mut last_updated: Option<i64> = None;

        for item in self.db.scan_prefix(KEY_PREFIX) {
            let (key, value) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            let key = String::from_utf8(key[KEY_PREFIX.len()..].to_vec())
                .map_err(|e| CacheError::SerializationError(e.to_string()))?;
            let entry: StoredEntry = bincode::deserialize(&value)
                .map_err(|e| CacheError::SerializationError(e.to_string()))?;
            if entry.size_bytes != entry.data.len() as u64 {
                return Err(CacheError::SerializationError(format!(
                    "entry {} declares {} bytes but holds {}",
                    key,
                    entry.size_bytes,
                    entry.data.len()
                )));
            }
            total_size_bytes += entry.size_bytes;
            last_updated = last_updated.max(Some(entry.updated_at));
            entries.insert(key, entry.data);
        }

        tracing::info!(
            entries = entries.len(),
            total_size_bytes = total_size_bytes,
            last_updated = ?last_updated.and_then(|t| chrono::DateTime::<Utc>::from_timestamp(t, 0)),
            "Media store loaded"
        );
        Ok(entries)
    }

    async fn save(&self, entries: &HashMap<String, Vec<u8>>) -> Result<(), CacheError> {
        let mut batch = sled::Batch::default();
        let now = Utc::now().timestamp();

        // 不在映射里的旧条目一并删除
        for item in self.db.scan_prefix(KEY_PREFIX) {
            let (key, _) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            let stale = std::str::from_utf8(&key[KEY_PREFIX.len()..])
                .map(|k| !entries.contains_key(k))
                .unwrap_or(true);
            if stale {
                batch.remove(key);
            }
        }

        for (key, data) in entries {
            let entry = StoredEntry {
                data: data.clone(),
                size_bytes: data.len() as u64,
                updated_at: now,
            };
            let entry_bytes = bincode::serialize(&entry)
                .map_err(|e| CacheError::SerializationError(e.to_string()))?;
            batch.insert(Self::storage_key(key).as_bytes(), entry_bytes);
        }

        self.db
            .apply_batch(batch)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::debug!(entries = entries.len(), "Media store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SledMediaStore::open(dir.path().join("media.sled")).unwrap();

        let mut entries = HashMap::new();
        entries.insert("Preheat-Preheat oven to 450°F".to_string(), vec![1, 2, 3]);
        entries.insert("feedback".to_string(), Vec::new());
        store.save(&entries).await.unwrap();

        assert_eq!(store.load().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_save_replaces_mapping() {
        let dir = tempdir().unwrap();
        let store = SledMediaStore::open(dir.path().join("media.sled")).unwrap();

        let mut first = HashMap::new();
        first.insert("a".to_string(), vec![1]);
        first.insert("b".to_string(), vec![2]);
        store.save(&first).await.unwrap();

        let mut second = HashMap::new();
        second.insert("b".to_string(), vec![3]);
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("media.sled");

        {
            let store = SledMediaStore::open(&path).unwrap();
            let mut entries = HashMap::new();
            entries.insert("k".to_string(), vec![7, 7]);
            store.save(&entries).await.unwrap();
        }

        let store = SledMediaStore::open(&path).unwrap();
        assert_eq!(store.load().await.unwrap().get("k"), Some(&vec![7, 7]));
    }

    #[tokio::test]
    async fn test_load_rejects_size_mismatch() {
        let dir = tempdir().unwrap();
        let store = SledMediaStore::open(dir.path().join("media.sled")).unwrap();

        let entry = StoredEntry {
            data: vec![1, 2, 3],
            size_bytes: 5,
            updated_at: Utc::now().timestamp(),
        };
        store
            .db
            .insert(
                SledMediaStore::storage_key("step-1").as_bytes(),
                bincode::serialize(&entry).unwrap(),
            )
            .unwrap();

        assert!(matches!(
            store.load().await,
            Err(CacheError::SerializationError(_))
        ));
    }
}
