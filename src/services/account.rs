// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-out and password reset.

use std::sync::Arc;

use crate::db::{from_document, ProfileStore};
use crate::error::{AppError, Result};
use crate::models::{Role, StudentProfile, TrainerProfile};
use crate::services::auth::AuthProvider;
use crate::services::role_context::{StudentContext, TrainerContext};
use crate::services::session::Route;
use crate::services::validation::{is_valid_email, validate_login, ValidationError};

pub struct AccountService {
    store: Arc<dyn ProfileStore>,
    auth: Arc<dyn AuthProvider>,
    trainers: TrainerContext,
    students: StudentContext,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        auth: Arc<dyn AuthProvider>,
        trainers: TrainerContext,
        students: StudentContext,
    ) -> Self {
        Self {
            store,
            auth,
            trainers,
            students,
        }
    }

    /// Sign in as the role picked on the login screen.
    ///
    /// The profile is read from that role's partition only; an account of
    /// the other role gets "No data found".
    pub async fn sign_in(&self, email: &str, password: &str, role: Role) -> Result<Route> {
        validate_login(email, password)?;

        let identity = self.auth.sign_in(email.trim(), password).await?;
        let partition = role.partition();

        let Some(doc) = self.store.get_document(partition, &identity.uid).await? else {
            tracing::warn!(uid = %identity.uid, partition, "Signed in without a profile for role");
            return Err(AppError::NotFound(format!(
                "No data found in {}. Please sign up.",
                partition
            )));
        };

        tracing::info!(uid = %identity.uid, %role, "User signed in");
        match role {
            Role::Trainer => {
                let profile: TrainerProfile = from_document(doc)?;
                self.students.reset();
                self.trainers.populate(&identity.uid, profile.clone());
                Ok(Route::TrainerHome(profile))
            }
            Role::Student => {
                let profile: StudentProfile = from_document(doc)?;
                self.trainers.reset();
                self.students.populate(&identity.uid, profile.clone());
                Ok(Route::StudentHome(profile))
            }
        }
    }

    /// Sign out and drop both cached profiles.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.auth.sign_out().await;
        self.trainers.reset();
        self.students.reset();
        if let Err(ref e) = result {
            tracing::error!(error = %e, "Sign-out failed");
        }
        result
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(ValidationError::Email.into());
        }
        self.auth.send_password_reset(email).await?;
        tracing::info!(email, "Password reset email requested");
        Ok(())
    }
}
