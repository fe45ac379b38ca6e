// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-role cache of the signed-in user's profile.
//!
//! A `RoleContext` owns the only in-memory copy of the profile. Screens read
//! it through `snapshot()`/`subscribe()` and change it only through
//! `update()`, which applies the change locally first and then merge-writes
//! the named fields to the store.
//!
//! State machine: `Uninitialized -> Loading -> {Populated | Empty}`, back to
//! `Loading` on each identity change and `Empty` on sign-out.

use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::db::{from_document, to_document, ProfileStore, WriteMode};
use crate::error::{AppError, Result};
use crate::models::{RoleKind, Student, Trainer};
use crate::services::auth::{AuthProvider, Identity};
use crate::services::scope::TaskScope;

/// What `update()` does to the local snapshot when the remote write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Leave the optimistic value in place and mark the snapshot stale.
    #[default]
    KeepOptimistic,
    /// Restore the pre-update snapshot, unless a newer update superseded it.
    RevertOnFailure,
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_optimistic" => Ok(UpdatePolicy::KeepOptimistic),
            "revert" | "revert_on_failure" => Ok(UpdatePolicy::RevertOnFailure),
            other => Err(format!("unknown update policy: {}", other)),
        }
    }
}

/// Lifecycle of the cached profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextState<P> {
    Uninitialized,
    Loading,
    Populated(P),
    Empty,
}

/// Observable state of a role context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot<P> {
    pub state: ContextState<P>,
    /// Bumped on every local change to the profile
    pub version: u64,
    /// Set when the last write-through failed and the local value was kept
    pub stale: bool,
    /// Uid whose profile is populated
    owner: Option<String>,
    /// Bumped on every identity transition; results of older fetches are dropped
    epoch: u64,
    /// Write-throughs started but not yet finished
    writes_in_flight: usize,
}

impl<P> ContextSnapshot<P> {
    pub fn profile(&self) -> Option<&P> {
        match &self.state {
            ContextState::Populated(p) => Some(p),
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

type Cell<P> = watch::Sender<ContextSnapshot<P>>;

/// Leaves `Loading` for `Empty` if a fetch is dropped before it settles.
struct LoadGuard<'a, P> {
    cell: &'a Cell<P>,
    epoch: u64,
    armed: bool,
}

impl<P> Drop for LoadGuard<'_, P> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let epoch = self.epoch;
        self.cell.send_if_modified(|snap| {
            if snap.epoch != epoch || !matches!(snap.state, ContextState::Loading) {
                return false;
            }
            snap.state = ContextState::Empty;
            snap.version += 1;
            true
        });
    }
}

/// Counts one write-through for as long as it is alive.
struct WriteGuard<'a, P> {
    cell: &'a Cell<P>,
}

impl<P> Drop for WriteGuard<'_, P> {
    fn drop(&mut self) {
        self.cell.send_if_modified(|snap| {
            snap.writes_in_flight = snap.writes_in_flight.saturating_sub(1);
            false
        });
    }
}

/// Cache + update gateway for one role's profile.
pub struct RoleContext<R: RoleKind> {
    store: Arc<dyn ProfileStore>,
    auth: Arc<dyn AuthProvider>,
    policy: UpdatePolicy,
    cell: Arc<Cell<R::Profile>>,
}

impl<R: RoleKind> Clone for RoleContext<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            auth: self.auth.clone(),
            policy: self.policy,
            cell: self.cell.clone(),
        }
    }
}

pub type TrainerContext = RoleContext<Trainer>;
pub type StudentContext = RoleContext<Student>;

impl<R: RoleKind> RoleContext<R> {
    pub fn new(store: Arc<dyn ProfileStore>, auth: Arc<dyn AuthProvider>) -> Self {
        let (cell, _) = watch::channel(ContextSnapshot {
            state: ContextState::Uninitialized,
            version: 0,
            stale: false,
            owner: None,
            epoch: 0,
            writes_in_flight: 0,
        });
        Self {
            store,
            auth,
            policy: UpdatePolicy::default(),
            cell: Arc::new(cell),
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current profile, if populated.
    pub fn snapshot(&self) -> Option<R::Profile> {
        self.cell.borrow().profile().cloned()
    }

    pub fn state(&self) -> ContextState<R::Profile> {
        self.cell.borrow().state.clone()
    }

    pub fn version(&self) -> u64 {
        self.cell.borrow().version
    }

    pub fn is_stale(&self) -> bool {
        self.cell.borrow().stale
    }

    /// Watch state changes (for re-rendering).
    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot<R::Profile>> {
        self.cell.subscribe()
    }

    /// Enter `Loading` for `uid`; returns the new epoch.
    ///
    /// If the same user's profile still has writes in flight, that local
    /// copy is returned too: the read may not see those writes yet.
    fn begin_loading(&self, uid: &str) -> (u64, Option<R::Profile>) {
        let mut started = (0, None);
        self.cell.send_modify(|snap| {
            snap.epoch += 1;
            let previous = std::mem::replace(&mut snap.state, ContextState::Loading);
            let carried = match previous {
                ContextState::Populated(p)
                    if snap.writes_in_flight > 0 && snap.owner.as_deref() == Some(uid) =>
                {
                    Some(p)
                }
                _ => {
                    snap.stale = false;
                    None
                }
            };
            snap.owner = None;
            started = (snap.epoch, carried);
        });
        started
    }

    /// Apply a fetch result unless a newer transition happened meanwhile.
    fn settle(&self, epoch: u64, uid: &str, state: ContextState<R::Profile>) -> bool {
        self.cell.send_if_modified(|snap| {
            if snap.epoch != epoch {
                return false;
            }
            snap.owner = match state {
                ContextState::Populated(_) => Some(uid.to_string()),
                _ => None,
            };
            snap.state = state;
            snap.version += 1;
            true
        })
    }

    /// Load the profile for `identity` from this role's partition.
    ///
    /// Not found and transport failures both leave the context `Empty`;
    /// failures are logged, not returned.
    pub async fn fetch(&self, identity: &Identity) -> Option<R::Profile> {
        let partition = R::ROLE.partition();
        let (epoch, carried) = self.begin_loading(&identity.uid);
        let mut guard = LoadGuard {
            cell: self.cell.as_ref(),
            epoch,
            armed: true,
        };

        let fetched = match self.store.get_document(partition, &identity.uid).await {
            Ok(Some(doc)) => match from_document::<R::Profile>(doc) {
                Ok(profile) => {
                    tracing::info!(uid = %identity.uid, partition, "Profile fetched");
                    ContextState::Populated(profile)
                }
                Err(e) => {
                    tracing::error!(uid = %identity.uid, partition, error = %e, "Error decoding profile");
                    ContextState::Empty
                }
            },
            Ok(None) => {
                tracing::debug!(uid = %identity.uid, partition, "No profile in partition");
                ContextState::Empty
            }
            Err(e) => {
                tracing::error!(uid = %identity.uid, partition, error = %e, "Error fetching profile");
                ContextState::Empty
            }
        };

        let state = match carried {
            Some(local) => {
                tracing::debug!(uid = %identity.uid, partition, "Keeping local profile, writes still in flight");
                ContextState::Populated(local)
            }
            None => fetched,
        };

        guard.armed = false;
        if !self.settle(epoch, &identity.uid, state) {
            tracing::debug!(uid = %identity.uid, partition, "Discarding superseded fetch result");
        }
        self.snapshot()
    }

    /// Seed the context with `uid`'s profile, fetched elsewhere.
    pub fn populate(&self, uid: &str, profile: R::Profile) {
        self.cell.send_modify(|snap| {
            snap.epoch += 1;
            snap.state = ContextState::Populated(profile);
            snap.owner = Some(uid.to_string());
            snap.version += 1;
            snap.stale = false;
        });
    }

    /// Merge `update` into the profile and write the named fields through.
    ///
    /// Waits for an in-flight fetch to settle first. The signed-in user's
    /// profile must be loaded; nothing is written otherwise. The local
    /// snapshot changes before the remote write starts. If the write fails
    /// the error is returned and the snapshot is handled per the context's
    /// `UpdatePolicy`.
    pub async fn update(&self, update: R::Update) -> Result<()> {
        let Some(identity) = self.auth.current_identity() else {
            tracing::warn!(role = %R::ROLE, "No authenticated user. Cannot update profile.");
            return Err(AppError::Unauthorized);
        };

        let mut rx = self.cell.subscribe();
        let closed = rx
            .wait_for(|snap| !matches!(snap.state, ContextState::Loading))
            .await
            .is_err();
        if closed {
            return Err(AppError::Internal(anyhow::anyhow!("Role context closed")));
        }

        let fields = to_document(&update)?;

        let mut applied = None;
        self.cell.send_if_modified(|snap| {
            if snap.owner.as_deref() != Some(identity.uid.as_str()) {
                return false;
            }
            let ContextState::Populated(profile) = &mut snap.state else {
                return false;
            };
            let before = profile.clone();
            R::apply(profile, &update);
            snap.version += 1;
            snap.writes_in_flight += 1;
            applied = Some((before, snap.version));
            true
        });

        let Some((previous, my_version)) = applied else {
            tracing::warn!(uid = %identity.uid, role = %R::ROLE, "No profile loaded for this role. Cannot update profile.");
            return Err(AppError::InconsistentState(format!(
                "No {} profile is loaded for this account.",
                R::ROLE
            )));
        };
        let _in_flight = WriteGuard {
            cell: self.cell.as_ref(),
        };

        if fields.is_empty() {
            tracing::debug!(uid = %identity.uid, "Empty update, nothing to write");
            return Ok(());
        }

        let partition = R::ROLE.partition();
        match self
            .store
            .set_document(partition, &identity.uid, fields, WriteMode::Merge)
            .await
        {
            Ok(()) => {
                self.cell.send_if_modified(|snap| {
                    if snap.version == my_version && snap.stale {
                        snap.stale = false;
                        return true;
                    }
                    false
                });
                tracing::info!(uid = %identity.uid, partition, "Profile updated");
                Ok(())
            }
            Err(e) => {
                tracing::error!(uid = %identity.uid, partition, error = %e, "Error updating profile");
                let policy = self.policy;
                self.cell.send_if_modified(|snap| {
                    if snap.version != my_version {
                        // A newer update or transition owns the snapshot now.
                        return false;
                    }
                    match policy {
                        UpdatePolicy::KeepOptimistic => snap.stale = true,
                        UpdatePolicy::RevertOnFailure => {
                            snap.state = ContextState::Populated(previous);
                            snap.version += 1;
                        }
                    }
                    true
                });
                Err(e)
            }
        }
    }

    /// Clear the snapshot (sign-out). Idempotent.
    pub fn reset(&self) {
        self.cell.send_modify(|snap| {
            snap.epoch += 1;
            if snap.state != ContextState::Empty {
                snap.version += 1;
            }
            snap.state = ContextState::Empty;
            snap.owner = None;
            snap.stale = false;
        });
    }

    /// Follow identity changes for the lifetime of `scope`.
    ///
    /// Each sign-in fetches the profile; sign-out resets. The subscription
    /// is released when the scope is cancelled.
    pub fn attach(&self, scope: &TaskScope) {
        let ctx = self.clone();
        let mut rx = self.auth.subscribe();
        let token = scope.token();

        scope.spawn(async move {
            loop {
                let identity = rx.borrow_and_update().clone();
                match identity {
                    Some(identity) => {
                        tracing::debug!(uid = %identity.uid, role = %R::ROLE, "User signed in, fetching profile");
                        ctx.fetch(&identity).await;
                    }
                    None => {
                        tracing::debug!(role = %R::ROLE, "User signed out, resetting profile");
                        ctx.reset();
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(role = %R::ROLE, "Identity listener stopped");
        });
    }
}
