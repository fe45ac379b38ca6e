// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TrainHub: trainer and student accounts for a sports coaching app
//!
//! This crate provides the session, profile and sign-up logic behind the
//! app's screens. Profiles live in Firestore, identities in Firebase Auth,
//! and student task lists in a local cache.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use db::{LocalCache, ProfileStore};
use services::{
    AccountService, AuthProvider, RosterService, SessionResolver, SignupService, StudentContext,
    TaskScope, TrainerContext,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProfileStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub cache: Arc<dyn LocalCache>,
    pub trainers: TrainerContext,
    pub students: StudentContext,
    pub signup: SignupService,
    pub accounts: AccountService,
    pub roster: RosterService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ProfileStore>,
        auth: Arc<dyn AuthProvider>,
        cache: Arc<dyn LocalCache>,
    ) -> Self {
        let trainers =
            TrainerContext::new(store.clone(), auth.clone()).with_policy(config.update_policy);
        let students =
            StudentContext::new(store.clone(), auth.clone()).with_policy(config.update_policy);

        Self {
            signup: SignupService::new(store.clone(), auth.clone()),
            accounts: AccountService::new(
                store.clone(),
                auth.clone(),
                trainers.clone(),
                students.clone(),
            ),
            roster: RosterService::new(store.clone()),
            config,
            store,
            auth,
            cache,
            trainers,
            students,
        }
    }

    /// Resolver that seeds this state's role contexts.
    pub fn resolver(&self) -> SessionResolver {
        SessionResolver::new(
            self.store.clone(),
            self.trainers.clone(),
            self.students.clone(),
            self.config.splash_delay,
        )
    }

    /// Keep both role contexts in step with the auth state for the scope's lifetime.
    pub fn attach_contexts(&self, scope: &TaskScope) {
        self.trainers.attach(scope);
        self.students.attach(scope);
    }
}
