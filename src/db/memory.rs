// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process profile store for tests and offline runs.
//!
//! Mirrors the remote store's merge semantics and can be switched into a
//! failing mode to simulate transport errors.

use super::{Document, ProfileStore, WriteMode};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory document store keyed by `(partition, key)`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<DashMap<(String, String), Document>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing failure injection.
    pub fn insert(&self, partition: &str, key: &str, doc: Document) {
        self.docs
            .insert((partition.to_string(), key.to_string()), doc);
    }

    /// Current stored copy of a document.
    pub fn document(&self, partition: &str, key: &str) -> Option<Document> {
        self.docs
            .get(&(partition.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Make every subsequent read fail with a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of single-document reads served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated read failure".to_string()));
        }
        Ok(())
    }

    fn partition_docs(&self, partition: &str) -> Vec<(String, Document)> {
        let mut docs: Vec<(String, Document)> = self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == partition)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        docs
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_document(&self, partition: &str, key: &str) -> Result<Option<Document>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.document(partition, key))
    }

    async fn set_document(
        &self,
        partition: &str,
        key: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".to_string()));
        }

        let id = (partition.to_string(), key.to_string());
        match mode {
            WriteMode::Replace => {
                self.docs.insert(id, data);
            }
            WriteMode::Merge => {
                let mut entry = self.docs.entry(id).or_default();
                for (field, value) in data {
                    entry.insert(field, value);
                }
            }
        }
        Ok(())
    }

    async fn query_by_field(
        &self,
        partition: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, AppError> {
        self.check_reads()?;
        Ok(self
            .partition_docs(partition)
            .into_iter()
            .filter(|(_, doc)| doc.get(field).and_then(|v| v.as_str()) == Some(value))
            .collect())
    }

    async fn list_documents(&self, partition: &str) -> Result<Vec<(String, Document)>, AppError> {
        self.check_reads()?;
        Ok(self.partition_docs(partition))
    }
}
