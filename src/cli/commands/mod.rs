mod check;
mod history;
mod list;

pub use check::cmd_check;
pub use history::cmd_history;
pub use list::cmd_list_equipment;
