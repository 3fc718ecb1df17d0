pub mod audit;
pub mod authorization;
pub use authorization::{Action, Decision, DenyReason, authorize};

pub mod equipment_service;
pub mod equipment_service_impl;
pub use equipment_service::{EquipmentError, EquipmentService};
pub use equipment_service_impl::SeaOrmEquipmentService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService};
pub use account_service_impl::SeaOrmAccountService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;
