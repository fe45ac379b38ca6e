// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Human-readable trainer and student IDs.
//!
//! IDs are six random digits (100000-999999), prefixed with `TR` for
//! trainers. `RandomId` does no uniqueness check; wrap it in
//! `CollisionChecked` to re-draw IDs that already exist in the store.

use async_trait::async_trait;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

use crate::db::{collections, ProfileStore};
use crate::error::AppError;

pub const TRAINER_ID_PREFIX: &str = "TR";
const ID_MIN: u32 = 100_000;
const ID_SPAN: u32 = 900_000;
const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Source of human-readable profile IDs.
#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn generate(&self) -> Result<String, AppError>;
}

/// Random six-digit IDs with an optional prefix.
#[derive(Clone)]
pub struct RandomId {
    prefix: &'static str,
    rng: SystemRandom,
}

impl RandomId {
    pub fn trainer() -> Self {
        Self {
            prefix: TRAINER_ID_PREFIX,
            rng: SystemRandom::new(),
        }
    }

    pub fn student() -> Self {
        Self {
            prefix: "",
            rng: SystemRandom::new(),
        }
    }

    /// Draw one ID.
    pub fn next_id(&self) -> Result<String, AppError> {
        let mut buf = [0u8; 4];
        self.rng
            .fill(&mut buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;
        let n = ID_MIN + u32::from_le_bytes(buf) % ID_SPAN;
        Ok(format!("{}{}", self.prefix, n))
    }
}

#[async_trait]
impl IdGenerator for RandomId {
    async fn generate(&self) -> Result<String, AppError> {
        self.next_id()
    }
}

/// Re-draws until the ID is unused in its partition.
pub struct CollisionChecked<G> {
    inner: G,
    store: Arc<dyn ProfileStore>,
    partition: &'static str,
    field: &'static str,
    max_attempts: usize,
}

impl CollisionChecked<RandomId> {
    pub fn trainer(store: Arc<dyn ProfileStore>) -> Self {
        Self::new(RandomId::trainer(), store, collections::TRAINERS, "trainerID")
    }

    pub fn student(store: Arc<dyn ProfileStore>) -> Self {
        Self::new(RandomId::student(), store, collections::STUDENTS, "studentID")
    }
}

impl<G: IdGenerator> CollisionChecked<G> {
    pub fn new(
        inner: G,
        store: Arc<dyn ProfileStore>,
        partition: &'static str,
        field: &'static str,
    ) -> Self {
        Self {
            inner,
            store,
            partition,
            field,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[async_trait]
impl<G: IdGenerator> IdGenerator for CollisionChecked<G> {
    async fn generate(&self) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let id = self.inner.generate().await?;
            let existing = self
                .store
                .query_by_field(self.partition, self.field, &id)
                .await?;
            if existing.is_empty() {
                return Ok(id);
            }
            tracing::debug!(id = %id, attempt, partition = self.partition, "Generated ID already taken");
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "No unused {} after {} attempts",
            self.field,
            self.max_attempts
        )))
    }
}

/// `TR` followed by exactly six digits.
pub fn is_trainer_id(id: &str) -> bool {
    id.strip_prefix(TRAINER_ID_PREFIX).is_some_and(is_student_id)
}

/// Exactly six digits.
pub fn is_student_id(id: &str) -> bool {
    id.len() == 6 && id.bytes().all(|b| b.is_ascii_digit())
}
