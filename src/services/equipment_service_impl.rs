//! `SeaORM` implementation of the `EquipmentService` trait.

use crate::api::types::{EquipmentDto, HistoryEntryDto};
use crate::db::Store;
use crate::domain::Actor;
use crate::domain::equipment::{EquipmentDraft, EquipmentInput};
use crate::entities::equipment;
use crate::services::audit;
use crate::services::equipment_service::{EquipmentError, EquipmentService};
use async_trait::async_trait;
use sea_orm::{DbErr, Set, SqlErr};
use tracing::{info, instrument};

pub struct SeaOrmEquipmentService {
    store: Store,
}

impl SeaOrmEquipmentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn conflict_or(err: DbErr, inventory_number: &str) -> EquipmentError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return EquipmentError::Conflict(format!(
            "Equipment with inventory number '{inventory_number}' already exists"
        ));
    }
    EquipmentError::from(err)
}

fn draft(input: &EquipmentInput) -> Result<EquipmentDraft, EquipmentError> {
    EquipmentDraft::from_input(input).map_err(EquipmentError::Validation)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl EquipmentService for SeaOrmEquipmentService {
    async fn list(&self) -> Result<Vec<EquipmentDto>, EquipmentError> {
        let rows = self.store.list_equipment().await?;
        Ok(rows.into_iter().map(EquipmentDto::from).collect())
    }

    async fn get(&self, id: &str) -> Result<EquipmentDto, EquipmentError> {
        self.store
            .get_equipment(id)
            .await?
            .map(EquipmentDto::from)
            .ok_or_else(|| EquipmentError::NotFound(id.to_string()))
    }

    async fn categories(&self) -> Result<Vec<String>, EquipmentError> {
        Ok(self.store.list_categories().await?)
    }

    async fn locations(&self) -> Result<Vec<String>, EquipmentError> {
        Ok(self.store.list_locations().await?)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.audit_name()))]
    async fn create(
        &self,
        actor: &Actor,
        input: &EquipmentInput,
    ) -> Result<EquipmentDto, EquipmentError> {
        let draft = draft(input)?;
        let changed_by = actor.audit_name();
        let timestamp = now();

        let row = equipment::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(draft.name.clone()),
            inventory_number: Set(draft.inventory_number.clone()),
            category: Set(draft.category),
            location: Set(draft.location),
            date_added: Set(draft.date_added),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp.clone()),
            created_by: Set(Some(changed_by.clone())),
            last_modified_by: Set(Some(changed_by.clone())),
        };

        let (created, entry) = self
            .store
            .equipment()
            .create_audited(row, |created| {
                audit::created_entry(created, &changed_by, &timestamp)
            })
            .await
            .map_err(|e| conflict_or(e, &draft.inventory_number))?;

        info!(
            equipment_id = %created.id,
            history_id = entry.id,
            inventory_number = %created.inventory_number,
            "Equipment created"
        );
        metrics::counter!("equipment_mutations_total", "action" => "created").increment(1);

        Ok(EquipmentDto::from(created))
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.audit_name()))]
    async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: &EquipmentInput,
    ) -> Result<EquipmentDto, EquipmentError> {
        let draft = draft(input)?;
        let changed_by = actor.audit_name();
        let timestamp = now();

        let (updated, entry) = self
            .store
            .equipment()
            .update_audited(id, &draft, &changed_by, &timestamp, |before, after| {
                audit::updated_entry(before, after, &changed_by, &timestamp)
            })
            .await
            .map_err(|e| conflict_or(e, &draft.inventory_number))?
            .ok_or_else(|| EquipmentError::NotFound(id.to_string()))?;

        match entry {
            Some(entry) => {
                info!(
                    equipment_id = %updated.id,
                    history_id = entry.id,
                    details = %entry.details,
                    "Equipment updated"
                );
                metrics::counter!("equipment_mutations_total", "action" => "updated").increment(1);
            }
            None => info!(equipment_id = %updated.id, "Equipment saved without changes"),
        }

        Ok(EquipmentDto::from(updated))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.audit_name()))]
    async fn delete(&self, actor: &Actor, id: &str) -> Result<(), EquipmentError> {
        let changed_by = actor.audit_name();
        let timestamp = now();

        let (deleted, entry) = self
            .store
            .equipment()
            .delete_audited(id, |row| {
                audit::deleted_entry(row, &changed_by, &timestamp)
            })
            .await?
            .ok_or_else(|| EquipmentError::NotFound(id.to_string()))?;

        info!(
            equipment_id = %deleted.id,
            history_id = entry.id,
            inventory_number = %deleted.inventory_number,
            "Equipment deleted"
        );
        metrics::counter!("equipment_mutations_total", "action" => "deleted").increment(1);

        Ok(())
    }

    async fn history(&self) -> Result<Vec<HistoryEntryDto>, EquipmentError> {
        let rows = self.store.list_history().await?;
        Ok(rows.into_iter().map(HistoryEntryDto::from).collect())
    }

    async fn recent_history(&self, limit: u64) -> Result<Vec<HistoryEntryDto>, EquipmentError> {
        let rows = self.store.recent_history(limit).await?;
        Ok(rows.into_iter().map(HistoryEntryDto::from).collect())
    }

    async fn history_for(&self, id: &str) -> Result<Vec<HistoryEntryDto>, EquipmentError> {
        let rows = self.store.history_for_equipment(id).await?;
        Ok(rows.into_iter().map(HistoryEntryDto::from).collect())
    }
}
