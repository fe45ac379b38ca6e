// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account creation for trainers and students.

use std::sync::Arc;

use crate::db::{collections, to_document, ProfileStore, WriteMode};
use crate::error::{AppError, Result};
use crate::models::{StudentProfile, TrainerProfile};
use crate::services::auth::AuthProvider;
use crate::services::ids::{CollisionChecked, IdGenerator};
use crate::services::validation::{
    validate_student, validate_trainer, SignUpDraft, StudentSignUpForm, TrainerSignUpForm,
};

/// A freshly created account.
#[derive(Debug, Clone)]
pub struct SignedUp<P> {
    pub uid: String,
    pub profile: P,
}

pub struct SignupService {
    store: Arc<dyn ProfileStore>,
    auth: Arc<dyn AuthProvider>,
    trainer_ids: Arc<dyn IdGenerator>,
    student_ids: Arc<dyn IdGenerator>,
}

impl SignupService {
    /// Service using collision-checked random IDs.
    pub fn new(store: Arc<dyn ProfileStore>, auth: Arc<dyn AuthProvider>) -> Self {
        let trainer_ids = Arc::new(CollisionChecked::trainer(store.clone()));
        let student_ids = Arc::new(CollisionChecked::student(store.clone()));
        Self::with_generators(store, auth, trainer_ids, student_ids)
    }

    pub fn with_generators(
        store: Arc<dyn ProfileStore>,
        auth: Arc<dyn AuthProvider>,
        trainer_ids: Arc<dyn IdGenerator>,
        student_ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            auth,
            trainer_ids,
            student_ids,
        }
    }

    /// ID for the "Generate Trainer ID" button.
    pub async fn generate_trainer_id(&self) -> Result<String> {
        let id = self.trainer_ids.generate().await?;
        tracing::debug!(trainer_id = %id, "Generated trainer ID");
        Ok(id)
    }

    /// ID for the "Generate Student ID" button.
    pub async fn generate_student_id(&self) -> Result<String> {
        let id = self.student_ids.generate().await?;
        tracing::debug!(student_id = %id, "Generated student ID");
        Ok(id)
    }

    pub async fn sign_up_trainer(&self, form: &TrainerSignUpForm) -> Result<SignedUp<TrainerProfile>> {
        let draft = validate_trainer(form)?;
        self.create(collections::TRAINERS, draft).await
    }

    /// Student sign-up. The trainer ID is checked before any identity exists.
    pub async fn sign_up_student(&self, form: &StudentSignUpForm) -> Result<SignedUp<StudentProfile>> {
        let draft = validate_student(form, self.store.as_ref()).await?;
        self.create(collections::STUDENTS, draft).await
    }

    async fn create<P: serde::Serialize>(
        &self,
        partition: &'static str,
        draft: SignUpDraft<P>,
    ) -> Result<SignedUp<P>> {
        let identity = self
            .auth
            .create_identity(&draft.email, &draft.password)
            .await
            .map_err(|e| {
                tracing::warn!(email = %draft.email, partition, error = %e, "Identity creation failed");
                AppError::Auth(e)
            })?;

        let doc = to_document(&draft.profile)?;
        if let Err(e) = self
            .store
            .set_document(partition, &identity.uid, doc, WriteMode::Replace)
            .await
        {
            // The identity stays; the account has no profile until it is rewritten.
            tracing::error!(
                uid = %identity.uid,
                email = %draft.email,
                partition,
                error = %e,
                "Profile write failed after identity creation, identity is orphaned"
            );
            return Err(e);
        }

        tracing::info!(uid = %identity.uid, partition, "Account created");
        Ok(SignedUp {
            uid: identity.uid,
            profile: draft.profile,
        })
    }
}
