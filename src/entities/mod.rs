pub mod prelude;

pub mod equipment;
pub mod equipment_history;
pub mod users;
