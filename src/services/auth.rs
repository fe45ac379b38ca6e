// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication collaborator.
//!
//! `FirebaseAuth` talks to the Identity Toolkit REST API:
//! - Email/password account creation and sign-in
//! - Password reset emails
//! - ID token refresh via the secure token endpoint
//! - Session persistence in the local cache, so a previous sign-in
//!   survives a restart
//!
//! Identity changes are published on a `watch` channel: a subscriber sees
//! the current state immediately and every later transition in order.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::db::cache::{load_json, store_json, LocalCache};
use crate::error::{AppError, AuthError};

/// Cache key holding the persisted session.
pub const SESSION_CACHE_KEY: &str = "session";

/// Refresh tokens this close to expiry (seconds).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// An authenticated user as issued by the auth backend.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable user ID; the key of the user's profile document
    pub uid: String,
    pub email: String,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the ID token needs refreshing before use.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Receiver side of the identity-change subscription. Drop to unsubscribe.
pub type IdentityWatch = watch::Receiver<Option<Identity>>;

/// Operations consumed from the auth backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AppError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribe to identity changes.
    fn subscribe(&self) -> IdentityWatch;
}

// ─────────────────────────────────────────────────────────────────────────────
// FirebaseAuth - Identity Toolkit REST client
// ─────────────────────────────────────────────────────────────────────────────

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Firebase Authentication client.
#[derive(Clone)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    cache: Arc<dyn LocalCache>,
    state: Arc<watch::Sender<Option<Identity>>>,
}

impl FirebaseAuth {
    /// Create a client for the given project API key.
    ///
    /// For local development, set FIREBASE_AUTH_EMULATOR_HOST.
    pub fn new(api_key: impl Into<String>, cache: Arc<dyn LocalCache>) -> Self {
        let (identity_url, token_url) = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                (
                    format!("http://{}/identitytoolkit.googleapis.com/v1", host),
                    format!("http://{}/securetoken.googleapis.com/v1", host),
                )
            }
            Err(_) => (IDENTITY_TOOLKIT_URL.to_string(), SECURE_TOKEN_URL.to_string()),
        };

        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            identity_url,
            token_url,
            cache,
            state: Arc::new(watch::channel(None).0),
        }
    }

    /// Restore the persisted session, refreshing an expired ID token.
    ///
    /// Publishes the result as the initial identity state. A session that
    /// can no longer be refreshed is dropped and the user starts signed out.
    pub async fn restore_session(&self) -> Result<Option<Identity>, AppError> {
        let Some(stored) = load_json::<Identity>(self.cache.as_ref(), SESSION_CACHE_KEY).await?
        else {
            tracing::debug!("No persisted session");
            self.state.send_replace(None);
            return Ok(None);
        };

        let expires_at = token_expiry(stored.id_token()).unwrap_or(stored.expires_at);
        let identity = Identity {
            expires_at,
            ..stored
        };

        let identity = if identity.needs_refresh(Utc::now()) {
            match self.refresh(&identity).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::warn!(uid = %identity.uid, error = %e, "Session refresh failed, signing out");
                    self.cache.remove(SESSION_CACHE_KEY).await?;
                    self.state.send_replace(None);
                    return Ok(None);
                }
            }
        } else {
            identity
        };

        tracing::info!(uid = %identity.uid, "Session restored");
        self.publish(Some(identity.clone())).await?;
        Ok(Some(identity))
    }

    /// Exchange the refresh token for a new ID token.
    pub async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", identity.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("Token refresh request failed: {}", e)))?;

        let body: RefreshResponse = check_response_json(response).await?;
        Ok(Identity {
            uid: body.user_id,
            email: identity.email.clone(),
            expires_at: expiry_from(&body.id_token, &body.expires_in),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }

    async fn password_call(&self, endpoint: &str, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/accounts:{}?key={}", self.identity_url, endpoint, self.api_key);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let body: PasswordAuthResponse = check_response_json(response).await?;
        Ok(Identity {
            uid: body.local_id,
            email: body.email,
            expires_at: expiry_from(&body.id_token, &body.expires_in),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }

    /// Persist and broadcast a new identity state.
    async fn publish(&self, identity: Option<Identity>) -> Result<(), AppError> {
        match &identity {
            Some(identity) => {
                store_json(self.cache.as_ref(), SESSION_CACHE_KEY, identity).await?
            }
            None => self.cache.remove(SESSION_CACHE_KEY).await?,
        }
        self.state.send_replace(identity);
        Ok(())
    }

    async fn publish_signed_in(&self, identity: &Identity) {
        if let Err(e) = self.publish(Some(identity.clone())).await {
            // The sign-in itself succeeded; only persistence across restarts is lost.
            tracing::warn!(uid = %identity.uid, error = %e, "Failed to persist session");
            self.state.send_replace(Some(identity.clone()));
        }
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.password_call("signUp", email, password).await?;
        tracing::info!(uid = %identity.uid, "Account created");
        self.publish_signed_in(&identity).await;
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.password_call("signInWithPassword", email, password).await?;
        tracing::info!(uid = %identity.uid, "User signed in");
        self.publish_signed_in(&identity).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.publish(None).await?;
        tracing::info!("User signed out");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let url = format!("{}/accounts:sendOobCode?key={}", self.identity_url, self.api_key);
        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let _: serde_json::Value = check_response_json(response).await?;
        tracing::info!("Password reset email sent");
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> IdentityWatch {
        self.state.subscribe()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Check response and parse JSON body, mapping backend error codes.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AuthError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => AuthError::from_code(&envelope.error.message),
            Err(_) => AuthError::Backend(format!("HTTP {}: {}", status, body)),
        });
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Backend(format!("JSON parse error: {}", e)))
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: i64,
}

/// Read `exp` from an ID token without verifying it.
///
/// The token is only inspected locally to decide when to refresh; the
/// backend verifies it on every request.
pub fn token_expiry(id_token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp, 0)
}

fn expiry_from(id_token: &str, expires_in: &str) -> DateTime<Utc> {
    token_expiry(id_token).unwrap_or_else(|| {
        let secs = expires_in.trim().parse::<i64>().unwrap_or(3600);
        Utc::now() + Duration::seconds(secs)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryAuth - in-process auth for tests and offline runs
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory accounts with the same state broadcasting as `FirebaseAuth`.
#[derive(Clone)]
pub struct MemoryAuth {
    accounts: Arc<dashmap::DashMap<String, (String, String)>>,
    next_uid: Arc<AtomicU64>,
    state: Arc<watch::Sender<Option<Identity>>>,
    reset_requests: Arc<dashmap::DashSet<String>>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self {
            accounts: Arc::default(),
            next_uid: Arc::new(AtomicU64::new(1)),
            state: Arc::new(watch::channel(None).0),
            reset_requests: Arc::default(),
        }
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account without signing in. Returns its uid.
    pub fn register(&self, email: &str, password: &str) -> String {
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst));
        self.accounts
            .insert(email.to_string(), (uid.clone(), password.to_string()));
        uid
    }

    /// Force the identity state, as if a session were restored.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_replace(identity);
    }

    /// Whether a reset email was requested for `email`.
    pub fn reset_requested(&self, email: &str) -> bool {
        self.reset_requests.contains(email)
    }

    /// A signed-in identity for `uid` with a long-lived fake token.
    pub fn identity_for(uid: &str, email: &str) -> Identity {
        Identity::new(
            uid,
            email,
            format!("token-{}", uid),
            format!("refresh-{}", uid),
            Utc::now() + Duration::hours(1),
        )
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if self.accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }
        let uid = self.register(email, password);
        let identity = Self::identity_for(&uid, email);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let (uid, stored) = self
            .accounts
            .get(email)
            .map(|entry| entry.value().clone())
            .ok_or(AuthError::InvalidCredentials)?;
        if stored != password {
            return Err(AuthError::InvalidCredentials);
        }
        let identity = Self::identity_for(&uid, email);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.state.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !self.accounts.contains_key(email) {
            return Err(AuthError::UserNotFound);
        }
        self.reset_requests.insert(email.to_string());
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> IdentityWatch {
        self.state.subscribe()
    }
}
