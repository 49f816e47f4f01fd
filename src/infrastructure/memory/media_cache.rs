//! In-Memory Media Cache Implementation
//!
//! DashMap 保存全部条目；可选挂接一个 KeyValueStorePort，
//! 打开时整表读入，每次 put 后整表写出

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::ports::{CacheError, CacheStats, KeyValueStorePort, MediaCachePort};

/// 内存媒体缓存
pub struct InMemoryMediaCache {
    entries: DashMap<String, Vec<u8>>,
    store: Option<Arc<dyn KeyValueStorePort>>,
    /// 串行化整表写出，避免旧快照覆盖新快照
    persist_lock: Mutex<()>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl InMemoryMediaCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            store: None,
            persist_lock: Mutex::new(()),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// 打开持久化缓存，读入已保存的全部条目
    pub async fn persistent(store: Arc<dyn KeyValueStorePort>) -> Result<Self, CacheError> {
        let loaded = store.load().await?;
        let entries: DashMap<String, Vec<u8>> = loaded.into_iter().collect();

        tracing::info!(entries = entries.len(), "Persistent media cache opened");

        Ok(Self {
            entries,
            store: Some(store),
            persist_lock: Mutex::new(()),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for InMemoryMediaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaCachePort for InMemoryMediaCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.value().clone()))
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), CacheError> {
        let size = data.len();
        self.entries.insert(key.to_string(), data);

        tracing::debug!(cache_key = %key, size_bytes = size, "Media cached");

        if let Some(store) = &self.store {
            let _guard = self.persist_lock.lock().await;
            store.save(&self.snapshot()).await?;
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.contains_key(key))
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            total_size_bytes: self.entries.iter().map(|e| e.value().len() as u64).sum(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }
}
