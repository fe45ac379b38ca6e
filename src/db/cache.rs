// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key-value cache of serialized values.
//!
//! Used for data that never leaves the device (student tasks, attendance,
//! the persisted auth session).

use crate::error::CacheError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// String key-value storage.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Read and parse a JSON value stored under `key`.
pub async fn load_json<T: DeserializeOwned>(
    cache: &dyn LocalCache,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match cache.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON under `key`.
pub async fn store_json<T: Serialize>(
    cache: &dyn LocalCache,
    key: &str,
    value: &T,
) -> Result<(), CacheError> {
    let raw = serde_json::to_string(value).map_err(|source| CacheError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    cache.set(key, raw).await
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open (and create if needed) the cache directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Local cache opened");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        // Write then rename so a crash never leaves a half-written entry.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory cache for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_cache_roundtrip_and_missing_key() {
        let dir = std::env::temp_dir().join(format!(
            "trainhub-cache-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let cache = FileCache::open(&dir).await.unwrap();

        assert_eq!(cache.get("streak").await.unwrap(), None);
        cache.set("streak", "4".to_string()).await.unwrap();
        assert_eq!(cache.get("streak").await.unwrap(), Some("4".to_string()));
        cache.remove("streak").await.unwrap();
        assert_eq!(cache.get("streak").await.unwrap(), None);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_corrupt_entry_reports_key() {
        let cache = MemoryCache::new();
        cache.set("tasks", "{not json".to_string()).await.unwrap();
        let result: Result<Option<Vec<u32>>, _> = load_json(&cache, "tasks").await;
        match result {
            Err(CacheError::Corrupt { key, .. }) => assert_eq!(key, "tasks"),
            other => panic!("expected corrupt entry, got {:?}", other),
        }
    }
}
