//! Domain service for the equipment inventory and its audit trail.
//!
//! Every mutation writes its history entry in the same transaction as the row
//! change. Callers are expected to have passed the authorization gate first.

use crate::api::types::{EquipmentDto, HistoryEntryDto};
use crate::domain::Actor;
use crate::domain::equipment::EquipmentInput;
use thiserror::Error;

/// Errors specific to equipment operations.
#[derive(Debug, Error)]
pub enum EquipmentError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Equipment not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EquipmentError {
    fn from(err: sea_orm::DbErr) -> Self {
        if crate::db::is_lock_contention(&err) {
            return Self::Conflict(
                "Equipment is being modified by another request, try again".to_string(),
            );
        }

        match err {
            sea_orm::DbErr::ConnectionAcquire(e) => Self::StorageUnavailable(e.to_string()),
            sea_orm::DbErr::Conn(e) => Self::StorageUnavailable(e.to_string()),
            sea_orm::DbErr::RecordNotUpdated => Self::Conflict(
                "Equipment was modified concurrently, reload and try again".to_string(),
            ),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for EquipmentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for equipment.
#[async_trait::async_trait]
pub trait EquipmentService: Send + Sync {
    /// Lists every unit, newest first.
    async fn list(&self) -> Result<Vec<EquipmentDto>, EquipmentError>;

    /// Gets a unit by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EquipmentError::NotFound`] if no such unit exists.
    async fn get(&self, id: &str) -> Result<EquipmentDto, EquipmentError>;

    /// Distinct normalized categories, ascending.
    async fn categories(&self) -> Result<Vec<String>, EquipmentError>;

    /// Distinct normalized locations, ascending.
    async fn locations(&self) -> Result<Vec<String>, EquipmentError>;

    /// Validates `input`, inserts the unit and its `Created` entry.
    ///
    /// # Errors
    ///
    /// Returns [`EquipmentError::Validation`] for missing fields or a bad date
    /// and [`EquipmentError::Conflict`] for a duplicate inventory number.
    async fn create(
        &self,
        actor: &Actor,
        input: &EquipmentInput,
    ) -> Result<EquipmentDto, EquipmentError>;

    /// Replaces all tracked fields. Writes an `Updated` entry only when at
    /// least one of them changed.
    async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: &EquipmentInput,
    ) -> Result<EquipmentDto, EquipmentError>;

    /// Deletes the unit and writes its `Deleted` entry.
    async fn delete(&self, actor: &Actor, id: &str) -> Result<(), EquipmentError>;

    /// Whole audit log, newest first.
    async fn history(&self) -> Result<Vec<HistoryEntryDto>, EquipmentError>;

    /// The `limit` most recent audit entries.
    async fn recent_history(&self, limit: u64) -> Result<Vec<HistoryEntryDto>, EquipmentError>;

    /// Audit entries for one unit, including units that no longer exist.
    async fn history_for(&self, id: &str) -> Result<Vec<HistoryEntryDto>, EquipmentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_db_errors_map_to_kinds() {
        assert!(matches!(
            EquipmentError::from(DbErr::RecordNotUpdated),
            EquipmentError::Conflict(_)
        ));
        assert!(matches!(
            EquipmentError::from(DbErr::Conn(RuntimeErr::Internal("refused".into()))),
            EquipmentError::StorageUnavailable(_)
        ));
        assert!(matches!(
            EquipmentError::from(DbErr::Exec(RuntimeErr::Internal("boom".into()))),
            EquipmentError::Database(_)
        ));
    }
}
