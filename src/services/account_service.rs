//! Domain service for account administration.
//!
//! Account changes are persisted directly and, unlike equipment changes, leave
//! no history entries.

use crate::api::types::{AccountDto, CreateAccountRequest, UpdateAccountRequest};
use crate::domain::Role;
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The target is an administrator account, which cannot be changed or
    /// removed here.
    #[error("Account is protected: {0}")]
    Protected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::ConnectionAcquire(e) => Self::StorageUnavailable(e.to_string()),
            sea_orm::DbErr::Conn(e) => Self::StorageUnavailable(e.to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Lists accounts ordered by username, without password hashes.
    async fn list(&self) -> Result<Vec<AccountDto>, AccountError>;

    /// Role currently stored on account `id`, used to decide whether the row
    /// is protected.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if no such account exists.
    async fn role_of(&self, id: &str) -> Result<Role, AccountError>;

    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for missing fields, an unknown
    /// role or a short password, and [`AccountError::Conflict`] for a taken
    /// username.
    async fn create(&self, request: &CreateAccountRequest) -> Result<AccountDto, AccountError>;

    /// Applies any subset of username, password, role and department.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Protected`] when the row holds the `admin` role
    /// at write time, even if it was promoted after the caller checked.
    async fn update(
        &self,
        id: &str,
        request: &UpdateAccountRequest,
    ) -> Result<AccountDto, AccountError>;

    /// Removes the account unless it holds the `admin` role at write time.
    async fn delete(&self, id: &str) -> Result<(), AccountError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_connection_errors_are_storage_unavailable() {
        assert!(matches!(
            AccountError::from(DbErr::Conn(RuntimeErr::Internal("refused".into()))),
            AccountError::StorageUnavailable(_)
        ));
        assert!(matches!(
            AccountError::from(DbErr::Query(RuntimeErr::Internal("boom".into()))),
            AccountError::Database(_)
        ));
    }
}
