// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Backend project credentials are opaque to the client logic; they are
//! read once at startup and handed to the collaborators that need them.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::role_context::UpdatePolicy;

/// Default splash screen delay before routing an unauthenticated user.
pub const DEFAULT_SPLASH_DELAY_MS: u64 = 3000;

/// Firebase project settings, passed through to the SDK clients.
#[derive(Debug, Clone, Default)]
pub struct FirebaseSettings {
    /// Web API key (public, identifies the project to the auth API)
    pub api_key: String,
    /// Project ID (Firestore database owner)
    pub project_id: String,
    pub auth_domain: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub firebase: FirebaseSettings,
    /// Directory backing the local key-value cache
    pub cache_dir: PathBuf,
    /// Splash delay applied before routing to sign-in
    pub splash_delay: Duration,
    /// What a role context does with its snapshot when a write-through fails
    pub update_policy: UpdatePolicy,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            firebase: FirebaseSettings {
                api_key: "test-api-key".to_string(),
                project_id: "test-project".to_string(),
                ..Default::default()
            },
            cache_dir: PathBuf::from("./.trainhub-test"),
            splash_delay: Duration::ZERO,
            update_policy: UpdatePolicy::KeepOptimistic,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let splash_delay_ms = match env::var("TRAINHUB_SPLASH_DELAY_MS") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("TRAINHUB_SPLASH_DELAY_MS", v))?,
            Err(_) => DEFAULT_SPLASH_DELAY_MS,
        };

        let update_policy = match env::var("TRAINHUB_UPDATE_POLICY") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("TRAINHUB_UPDATE_POLICY", v))?,
            Err(_) => UpdatePolicy::default(),
        };

        Ok(Self {
            firebase: FirebaseSettings {
                api_key: required("FIREBASE_API_KEY")?,
                project_id: required("FIREBASE_PROJECT_ID")?,
                auth_domain: optional("FIREBASE_AUTH_DOMAIN"),
                storage_bucket: optional("FIREBASE_STORAGE_BUCKET"),
                messaging_sender_id: optional("FIREBASE_MESSAGING_SENDER_ID"),
                app_id: optional("FIREBASE_APP_ID"),
                measurement_id: optional("FIREBASE_MEASUREMENT_ID"),
            },
            cache_dir: env::var("TRAINHUB_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./.trainhub")),
            splash_delay: Duration::from_millis(splash_delay_ms),
            update_policy,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
