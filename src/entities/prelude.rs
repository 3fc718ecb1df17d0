pub use super::equipment::Entity as Equipment;
pub use super::equipment_history::Entity as EquipmentHistory;
pub use super::users::Entity as Users;
