// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the profile store.
//!
//! Documents are exchanged as JSON maps; the typed profile layer sits above.
//! Merge writes become update calls with a field mask naming exactly the
//! fields being written, so untouched fields keep their remote values.

use super::{Document, ProfileStore, WriteMode};
use crate::error::AppError;
use async_trait::async_trait;

/// Metadata fields the SDK injects into deserialized documents.
const FIRESTORE_META_PREFIX: &str = "_firestore_";
const FIRESTORE_ID_FIELD: &str = "_firestore_id";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

/// Split SDK metadata off a queried document, returning its ID.
fn take_document_id(mut doc: Document) -> Result<(String, Document), AppError> {
    let id = match doc.remove(FIRESTORE_ID_FIELD) {
        Some(serde_json::Value::String(id)) => id,
        _ => {
            return Err(AppError::Database(
                "Queried document is missing its ID".to_string(),
            ))
        }
    };
    Ok((id, strip_metadata(doc)))
}

fn strip_metadata(mut doc: Document) -> Document {
    doc.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));
    doc
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_document(&self, partition: &str, key: &str) -> Result<Option<Document>, AppError> {
        let doc: Option<Document> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(partition)
            .obj()
            .one(key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc.map(strip_metadata))
    }

    async fn set_document(
        &self,
        partition: &str,
        key: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let _: () = match mode {
            WriteMode::Replace => client
                .fluent()
                .update()
                .in_col(partition)
                .document_id(key)
                .object(&data)
                .execute()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?,
            WriteMode::Merge => {
                let fields: Vec<String> = data.keys().cloned().collect();
                client
                    .fluent()
                    .update()
                    .fields(fields)
                    .in_col(partition)
                    .document_id(key)
                    .object(&data)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?
            }
        };

        tracing::debug!(partition, key, ?mode, "Document written");
        Ok(())
    }

    async fn query_by_field(
        &self,
        partition: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, AppError> {
        let docs: Vec<Document> = self
            .get_client()?
            .fluent()
            .select()
            .from(partition)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        docs.into_iter().map(take_document_id).collect()
    }

    async fn list_documents(&self, partition: &str) -> Result<Vec<(String, Document)>, AppError> {
        let docs: Vec<Document> = self
            .get_client()?
            .fluent()
            .select()
            .from(partition)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        docs.into_iter().map(take_document_id).collect()
    }
}
