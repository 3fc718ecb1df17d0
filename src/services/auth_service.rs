//! Domain service for authentication.
//!
//! Handles credential checks at login and self-service password changes.

use crate::domain::Actor;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the actor to store in the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password, without saying which.
    async fn login(&self, username: &str, password: &str) -> Result<Actor, AuthError>;

    /// Rebuilds a session actor from its stored account so role changes and
    /// deletions apply to sessions that already exist.
    ///
    /// Returns `Ok(None)` when the account no longer exists.
    async fn refresh(&self, actor: &Actor) -> Result<Option<Actor>, AuthError>;

    /// Changes a user's own password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is incorrect
    /// or the new one is too short or unchanged.
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
