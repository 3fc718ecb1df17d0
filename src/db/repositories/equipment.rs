use crate::domain::equipment::EquipmentDraft;
use crate::entities::{equipment, equipment_history, prelude::*};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

pub struct EquipmentRepository {
    conn: DatabaseConnection,
}

impl EquipmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<equipment::Model>, DbErr> {
        Equipment::find()
            .order_by_desc(equipment::Column::CreatedAt)
            .all(&self.conn)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<equipment::Model>, DbErr> {
        Equipment::find_by_id(id.to_string()).one(&self.conn).await
    }

    pub async fn distinct_categories(&self) -> Result<Vec<String>, DbErr> {
        Equipment::find()
            .select_only()
            .column(equipment::Column::Category)
            .distinct()
            .order_by_asc(equipment::Column::Category)
            .into_tuple::<String>()
            .all(&self.conn)
            .await
    }

    pub async fn distinct_locations(&self) -> Result<Vec<String>, DbErr> {
        Equipment::find()
            .select_only()
            .column(equipment::Column::Location)
            .distinct()
            .order_by_asc(equipment::Column::Location)
            .into_tuple::<String>()
            .all(&self.conn)
            .await
    }

    /// Inserts a new row and the history entry derived from it in one
    /// transaction. A unique violation aborts both.
    pub async fn create_audited<F>(
        &self,
        row: equipment::ActiveModel,
        audit: F,
    ) -> Result<(equipment::Model, equipment_history::Model), DbErr>
    where
        F: FnOnce(&equipment::Model) -> equipment_history::ActiveModel + Send,
    {
        let txn = self.conn.begin().await?;

        let created = row.insert(&txn).await?;
        let entry = audit(&created).insert(&txn).await?;

        txn.commit().await?;
        Ok((created, entry))
    }

    /// Applies `draft` to the row `id` and records the history entry built by
    /// `audit` from the before/after pair, all inside one transaction.
    ///
    /// The write lock is taken before the row is read, so concurrent edits of
    /// the same unit run one after another and each diffs against the state
    /// the previous one committed. The write is still conditioned on
    /// `updated_at` matching the value read; a mismatch fails with
    /// [`DbErr::RecordNotUpdated`] instead of producing a wrong diff.
    ///
    /// Returns `Ok(None)` when the row does not exist.
    pub async fn update_audited<F>(
        &self,
        id: &str,
        draft: &EquipmentDraft,
        modified_by: &str,
        updated_at: &str,
        audit: F,
    ) -> Result<Option<(equipment::Model, Option<equipment_history::Model>)>, DbErr>
    where
        F: FnOnce(&equipment::Model, &equipment::Model) -> Option<equipment_history::ActiveModel>
            + Send,
    {
        let txn = self.conn.begin().await?;
        lock_for_write(&txn, id).await?;

        let Some(before) = Equipment::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let result = Equipment::update_many()
            .col_expr(equipment::Column::Name, Expr::value(draft.name.clone()))
            .col_expr(
                equipment::Column::InventoryNumber,
                Expr::value(draft.inventory_number.clone()),
            )
            .col_expr(
                equipment::Column::Category,
                Expr::value(draft.category.clone()),
            )
            .col_expr(
                equipment::Column::Location,
                Expr::value(draft.location.clone()),
            )
            .col_expr(
                equipment::Column::DateAdded,
                Expr::value(draft.date_added.clone()),
            )
            .col_expr(equipment::Column::UpdatedAt, Expr::value(updated_at))
            .col_expr(
                equipment::Column::LastModifiedBy,
                Expr::value(modified_by),
            )
            .filter(equipment::Column::Id.eq(id))
            .filter(equipment::Column::UpdatedAt.eq(before.updated_at.clone()))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            debug!(equipment_id = %id, "Row changed between read and write");
            return Err(DbErr::RecordNotUpdated);
        }

        let after = Equipment::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("equipment {id}")))?;

        let entry = match audit(&before, &after) {
            Some(entry) => Some(entry.insert(&txn).await?),
            None => None,
        };

        txn.commit().await?;
        Ok(Some((after, entry)))
    }

    /// Deletes the row `id` and records the history entry built from its last
    /// state. Returns `Ok(None)` when the row does not exist.
    pub async fn delete_audited<F>(
        &self,
        id: &str,
        audit: F,
    ) -> Result<Option<(equipment::Model, equipment_history::Model)>, DbErr>
    where
        F: FnOnce(&equipment::Model) -> equipment_history::ActiveModel + Send,
    {
        let txn = self.conn.begin().await?;
        lock_for_write(&txn, id).await?;

        let Some(before) = Equipment::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let result = Equipment::delete_many()
            .filter(equipment::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        let entry = audit(&before).insert(&txn).await?;

        txn.commit().await?;
        Ok(Some((before, entry)))
    }
}

/// Opens the write side of `txn` with a no-op update on row `id`.
///
/// SQLite transactions start deferred. One that reads first and writes later
/// cannot wait for a competing writer and fails with `SQLITE_BUSY` at once.
/// Writing first makes it queue on the connection's busy timeout instead.
async fn lock_for_write(txn: &DatabaseTransaction, id: &str) -> Result<(), DbErr> {
    Equipment::update_many()
        .col_expr(
            equipment::Column::UpdatedAt,
            Expr::col(equipment::Column::UpdatedAt).into(),
        )
        .filter(equipment::Column::Id.eq(id))
        .exec(txn)
        .await?;
    Ok(())
}
