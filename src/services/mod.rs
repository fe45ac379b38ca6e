// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod account;
pub mod auth;
pub mod ids;
pub mod role_context;
pub mod roster;
pub mod scope;
pub mod session;
pub mod signup;
pub mod tasks;
pub mod validation;

pub use account::AccountService;
pub use auth::{AuthProvider, FirebaseAuth, Identity, IdentityWatch, MemoryAuth};
pub use ids::{CollisionChecked, IdGenerator, RandomId};
pub use role_context::{
    ContextSnapshot, ContextState, RoleContext, StudentContext, TrainerContext, UpdatePolicy,
};
pub use roster::{NearbyTrainer, RosterService};
pub use scope::TaskScope;
pub use session::{Navigator, ProfileDirectory, Route, SessionResolver};
pub use signup::{SignedUp, SignupService};
pub use tasks::TaskTracker;
