// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Startup/auth-change routing.
//!
//! Every identity transition is resolved to exactly one `Route`: sign-in
//! when nobody is signed in, otherwise the home screen of whichever
//! partition holds the user's profile. Trainers are looked up first.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::{collections, from_document, ProfileStore};
use crate::error::Result;
use crate::models::{Profile, StudentProfile, TrainerProfile};
use crate::services::auth::{Identity, IdentityWatch};
use crate::services::role_context::{StudentContext, TrainerContext};

/// Where the app should land.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    SignIn,
    TrainerHome(TrainerProfile),
    StudentHome(StudentProfile),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::SignIn => "sign_in",
            Route::TrainerHome(_) => "trainer_home",
            Route::StudentHome(_) => "student_home",
        }
    }
}

/// Screen stack owner. `replace` swaps the current screen without leaving
/// the resolution screen in history.
pub trait Navigator: Send + Sync {
    fn replace(&self, route: Route);
}

/// Looks up a profile across both partitions.
#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn ProfileStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Trainer partition first, then student. One read each, no retry.
    pub async fn find_profile(&self, uid: &str) -> Result<Option<Profile>> {
        if let Some(doc) = self.store.get_document(collections::TRAINERS, uid).await? {
            return Ok(Some(Profile::Trainer(from_document(doc)?)));
        }
        if let Some(doc) = self.store.get_document(collections::STUDENTS, uid).await? {
            return Ok(Some(Profile::Student(from_document(doc)?)));
        }
        Ok(None)
    }
}

pub struct SessionResolver {
    directory: ProfileDirectory,
    trainers: TrainerContext,
    students: StudentContext,
    splash_delay: Duration,
}

impl SessionResolver {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        trainers: TrainerContext,
        students: StudentContext,
        splash_delay: Duration,
    ) -> Self {
        Self {
            directory: ProfileDirectory::new(store),
            trainers,
            students,
            splash_delay,
        }
    }

    /// Decide the route for one identity state.
    ///
    /// A found profile seeds the matching role context and clears the other.
    /// Signed out clears both.
    /// An identity with no profile anywhere is an inconsistent account and
    /// routes to sign-in.
    pub async fn resolve(&self, identity: Option<&Identity>) -> Route {
        let Some(identity) = identity else {
            self.trainers.reset();
            self.students.reset();
            if !self.splash_delay.is_zero() {
                tokio::time::sleep(self.splash_delay).await;
            }
            return Route::SignIn;
        };

        match self.directory.find_profile(&identity.uid).await {
            Ok(Some(profile)) => {
                tracing::info!(uid = %identity.uid, role = %profile.role(), name = profile.name(), "Resolved session");
                match profile {
                    Profile::Trainer(profile) => {
                        self.students.reset();
                        self.trainers.populate(&identity.uid, profile.clone());
                        Route::TrainerHome(profile)
                    }
                    Profile::Student(profile) => {
                        self.trainers.reset();
                        self.students.populate(&identity.uid, profile.clone());
                        Route::StudentHome(profile)
                    }
                }
            }
            Ok(None) => {
                tracing::warn!(
                    uid = %identity.uid,
                    email = %identity.email,
                    "Authenticated user has no trainer or student profile"
                );
                Route::SignIn
            }
            Err(e) => {
                tracing::error!(uid = %identity.uid, error = %e, "Error resolving user profile");
                Route::SignIn
            }
        }
    }

    /// Resolve every identity transition until `cancel` fires.
    ///
    /// A resolution still in flight when the token is cancelled never
    /// reaches the navigator.
    pub async fn run(
        &self,
        mut identities: IdentityWatch,
        navigator: &dyn Navigator,
        cancel: CancellationToken,
    ) {
        loop {
            let identity = identities.borrow_and_update().clone();

            let route = tokio::select! {
                _ = cancel.cancelled() => break,
                route = self.resolve(identity.as_ref()) => route,
            };
            tracing::debug!(route = route.name(), "Navigating");
            navigator.replace(route);

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = identities.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Session resolver stopped");
    }
}
