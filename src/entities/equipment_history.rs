use sea_orm::entity::prelude::*;

/// Append-only audit record. `equipment_id` is a plain reference without a
/// foreign key so entries outlive the equipment they describe.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `Created`, `Updated` or `Deleted`
    pub action: String,

    pub equipment_id: String,

    pub equipment_name: String,

    pub equipment_inventory_number: String,

    pub details: String,

    pub changed_by: String,

    pub changed_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
