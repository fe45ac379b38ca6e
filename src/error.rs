// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

use crate::services::validation::ValidationError;

/// Failures reported by the authentication backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email already in use")]
    EmailInUse,

    #[error("weak password")]
    WeakPassword,

    #[error("invalid email")]
    InvalidEmail,

    #[error("email/password sign-in is disabled")]
    OperationNotAllowed,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("session expired")]
    TokenExpired,

    #[error("auth backend error: {0}")]
    Backend(String),

    #[error("auth transport error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Map an Identity Toolkit error code to a typed error.
    ///
    /// The backend sometimes appends detail after the code
    /// (`WEAK_PASSWORD : Password should be at least 6 characters`).
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => AuthError::OperationNotAllowed,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "MISSING_PASSWORD" => {
                AuthError::InvalidCredentials
            }
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" | "USER_DISABLED" => AuthError::UserNotFound,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => {
                AuthError::TokenExpired
            }
            _ => AuthError::Backend(message.to_string()),
        }
    }
}

/// Local cache failures.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Inconsistent account state: {0}")]
    InconsistentState(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The text a screen shows when this error ends a user action.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Please log in to continue.".to_string(),
            AppError::Validation(err) => err.to_string(),
            AppError::Auth(err) => match err {
                AuthError::EmailInUse => {
                    "This email is already registered. Please log in instead.".to_string()
                }
                AuthError::WeakPassword => {
                    "Password is too weak. Please use at least 6 characters with letters and numbers."
                        .to_string()
                }
                AuthError::InvalidEmail => {
                    "Invalid email format. Please check your email address.".to_string()
                }
                AuthError::OperationNotAllowed => {
                    "Email/password accounts are not enabled. Please contact support.".to_string()
                }
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Login failed: invalid email or password.".to_string()
                }
                AuthError::TokenExpired => "Your session has expired. Please log in again.".to_string(),
                AuthError::Backend(msg) | AuthError::Transport(msg) => {
                    format!("Login failed: {}", msg)
                }
            },
            AppError::NotFound(msg) => msg.clone(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                format!("Failed to save data: {}", msg)
            }
            AppError::Cache(err) => {
                tracing::error!(error = %err, "Cache error");
                "Could not access local data.".to_string()
            }
            AppError::InconsistentState(msg) => msg.clone(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_strips_detail() {
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailInUse);
        assert_eq!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_unknown_code_is_backend_error() {
        assert_eq!(
            AuthError::from_code("QUOTA_EXCEEDED"),
            AuthError::Backend("QUOTA_EXCEEDED".to_string())
        );
    }

    #[test]
    fn test_email_in_use_message() {
        let err = AppError::from(AuthError::EmailInUse);
        assert_eq!(
            err.user_message(),
            "This email is already registered. Please log in instead."
        );
    }
}
