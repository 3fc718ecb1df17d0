pub mod equipment;
pub mod history;
pub mod user;
