use crate::entities::{equipment_history, prelude::*};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Read side of the audit log. Entries are only ever written by
/// `EquipmentRepository` inside the mutation transaction, never updated or
/// deleted.
pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<equipment_history::Model>, DbErr> {
        EquipmentHistory::find()
            .order_by_desc(equipment_history::Column::ChangedAt)
            .order_by_desc(equipment_history::Column::Id)
            .all(&self.conn)
            .await
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<equipment_history::Model>, DbErr> {
        EquipmentHistory::find()
            .order_by_desc(equipment_history::Column::ChangedAt)
            .order_by_desc(equipment_history::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
    }

    pub async fn for_equipment(
        &self,
        equipment_id: &str,
    ) -> Result<Vec<equipment_history::Model>, DbErr> {
        EquipmentHistory::find()
            .filter(equipment_history::Column::EquipmentId.eq(equipment_id))
            .order_by_desc(equipment_history::Column::ChangedAt)
            .order_by_desc(equipment_history::Column::Id)
            .all(&self.conn)
            .await
    }
}
