// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TrainHub session check
//!
//! Restores any saved Firebase session, resolves where the app would land
//! and logs the result.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trainhub::{
    config::Config,
    db::{FileCache, FirestoreDb, LocalCache},
    services::{AuthProvider, FirebaseAuth, Navigator, Route},
    AppState,
};

/// Logs each navigation instead of drawing a screen.
struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, route: Route) {
        match &route {
            Route::SignIn => tracing::info!(route = route.name(), "Showing sign-in"),
            Route::TrainerHome(p) => {
                tracing::info!(route = route.name(), name = %p.name, trainer_id = %p.trainer_id, "Showing trainer home")
            }
            Route::StudentHome(p) => {
                tracing::info!(route = route.name(), name = %p.name, student_id = %p.student_id, "Showing student home")
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(project = %config.firebase.project_id, "Starting TrainHub");

    // Initialize Firestore database
    let db = Arc::new(FirestoreDb::new(&config.firebase.project_id).await?);

    // Local cache for the auth session and student tasks
    let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&config.cache_dir).await?);
    tracing::info!(dir = %config.cache_dir.display(), "Local cache opened");

    // Firebase Auth, picking up a saved session if there is one
    let firebase = Arc::new(FirebaseAuth::new(config.firebase.api_key.clone(), cache.clone()));
    match firebase.restore_session().await {
        Ok(Some(identity)) => tracing::info!(uid = %identity.uid, "Restored session"),
        Ok(None) => tracing::info!("No saved session"),
        Err(e) => tracing::warn!(error = %e, "Could not restore session"),
    }
    let auth: Arc<dyn AuthProvider> = firebase;

    let state = AppState::new(config, db, auth.clone(), cache);
    let resolver = state.resolver();

    // Resolve the current identity once, or stop early on Ctrl-C
    let navigator = LogNavigator;
    let identity = auth.current_identity();
    tokio::select! {
        route = resolver.resolve(identity.as_ref()) => navigator.replace(route),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trainhub=debug,info")),
        )
        .with(format)
        .init();
}
