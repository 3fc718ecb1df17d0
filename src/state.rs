use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AuthService, EquipmentService, SeaOrmAccountService, SeaOrmAuthService,
    SeaOrmEquipmentService,
};

/// Long-lived handles shared by every request. Built once at startup; the
/// store is the only mutable resource and lives behind its own pool.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub equipment_service: Arc<dyn EquipmentService>,

    pub account_service: Arc<dyn AccountService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store).await
    }

    /// Wires services around an already opened store and seeds the bootstrap
    /// admin when the users table is empty.
    pub async fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        if let Some(password) = store.ensure_bootstrap_admin(&config.security).await? {
            tracing::warn!(
                username = %config.security.bootstrap_admin_username,
                password = %password,
                "Generated bootstrap admin password; it is shown only once"
            );
        }

        let equipment_service = Arc::new(SeaOrmEquipmentService::new(store.clone()))
            as Arc<dyn EquipmentService + Send + Sync + 'static>;

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            equipment_service,
            account_service,
            auth_service,
        })
    }
}
