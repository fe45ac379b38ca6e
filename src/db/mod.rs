// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage collaborators: the remote document store and the local cache.

pub mod cache;
pub mod firestore;
pub mod memory;

pub use cache::{load_json, store_json, FileCache, LocalCache, MemoryCache};
pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const TRAINERS: &str = "trainers";
    pub const STUDENTS: &str = "students";
}

/// A stored document: top-level field names to JSON values.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// How `set_document` treats fields already on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document.
    Replace,
    /// Write only the top-level fields present in the data.
    Merge,
}

/// Document read/write/query primitives keyed by partition and key.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read one document. `Ok(None)` when absent.
    async fn get_document(&self, partition: &str, key: &str) -> Result<Option<Document>, AppError>;

    async fn set_document(
        &self,
        partition: &str,
        key: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), AppError>;

    /// Equality lookup on a top-level string field. Returns `(key, document)` pairs.
    async fn query_by_field(
        &self,
        partition: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, AppError>;

    /// Every document in a partition.
    async fn list_documents(&self, partition: &str) -> Result<Vec<(String, Document)>, AppError>;
}

/// Serialize a value into a document, failing on non-object values.
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Internal(anyhow::anyhow!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Deserialize a document into a typed value.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::Object(doc))
        .map_err(|e| AppError::Database(format!("Malformed document: {}", e)))
}
