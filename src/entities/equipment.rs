use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    /// UUID v4 generated at creation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub inventory_number: String,

    pub category: String,

    pub location: String,

    /// Plain `YYYY-MM-DD`, stored as text so no timezone can shift it.
    pub date_added: String,

    pub created_at: String,

    pub updated_at: String,

    pub created_by: Option<String>,

    pub last_modified_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
