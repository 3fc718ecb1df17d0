use crate::config::SecurityConfig;
use crate::domain::Role;
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use crate::entities::equipment::Model as EquipmentRow;
pub use crate::entities::equipment_history::Model as HistoryRow;
pub use repositories::user::{Account, AccountChanges, GuardedWrite};

/// Whether `err` is SQLite reporting `SQLITE_BUSY` or `SQLITE_LOCKED` (any
/// extended code), i.e. a writer gave up waiting for another one.
#[must_use]
pub fn is_lock_contention(err: &sea_orm::DbErr) -> bool {
    use sea_orm::{DbErr, RuntimeErr};

    let (DbErr::Conn(RuntimeErr::SqlxError(e))
    | DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };

    e.as_database_error()
        .and_then(|db| db.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

/// Handle to the relational store. Constructed once at startup and passed to
/// every service; cloning shares the underlying pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.trim().is_empty() {
            anyhow::bail!(
                "Database is not configured: set general.database_path in config.toml or DATABASE_URL"
            );
        }

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to connect to database at {db_url}"))?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Closes the pool. Further queries on clones of this handle fail.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        info!("Database connection closed");
        Ok(())
    }

    /// The raw sqlx pool, shared with the session store.
    #[must_use]
    pub fn sqlite_pool(&self) -> &sea_orm::sqlx::SqlitePool {
        self.conn.get_sqlite_connection_pool()
    }

    /// Seeds one admin account when the users table is empty.
    ///
    /// Returns the generated password when none was configured so the caller
    /// can surface it once.
    pub async fn ensure_bootstrap_admin(&self, security: &SecurityConfig) -> Result<Option<String>> {
        if self.user_repo().count().await? > 0 {
            return Ok(None);
        }

        let (password, generated) = match security.bootstrap_admin_password.as_deref() {
            Some(password) if !password.is_empty() => (password.to_string(), false),
            _ => (repositories::user::generate_password(), true),
        };

        let hash = repositories::user::hash_password_blocking(&password, security).await?;
        self.user_repo()
            .create(
                &security.bootstrap_admin_username,
                hash,
                Role::Admin,
                "Administration",
            )
            .await
            .context("Failed to seed bootstrap admin account")?;

        warn!(
            username = %security.bootstrap_admin_username,
            "Seeded bootstrap admin account; change its password after first login"
        );

        Ok(generated.then_some(password))
    }

    fn history_repo(&self) -> repositories::history::HistoryRepository {
        repositories::history::HistoryRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    /// Equipment repository, including the transactional audited mutations.
    #[must_use]
    pub fn equipment(&self) -> repositories::equipment::EquipmentRepository {
        repositories::equipment::EquipmentRepository::new(self.conn.clone())
    }

    pub async fn list_equipment(&self) -> Result<Vec<EquipmentRow>, sea_orm::DbErr> {
        self.equipment().list().await
    }

    pub async fn get_equipment(&self, id: &str) -> Result<Option<EquipmentRow>, sea_orm::DbErr> {
        self.equipment().get(id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, sea_orm::DbErr> {
        self.equipment().distinct_categories().await
    }

    pub async fn list_locations(&self) -> Result<Vec<String>, sea_orm::DbErr> {
        self.equipment().distinct_locations().await
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryRow>, sea_orm::DbErr> {
        self.history_repo().list().await
    }

    pub async fn recent_history(&self, limit: u64) -> Result<Vec<HistoryRow>, sea_orm::DbErr> {
        self.history_repo().recent(limit).await
    }

    pub async fn history_for_equipment(
        &self,
        equipment_id: &str,
    ) -> Result<Vec<HistoryRow>, sea_orm::DbErr> {
        self.history_repo().for_equipment(equipment_id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, sea_orm::DbErr> {
        self.user_repo().list().await
    }

    pub async fn get_account(&self, id: &str) -> Result<Option<Account>, sea_orm::DbErr> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_account(
        &self,
        username: &str,
        password_hash: String,
        role: Role,
        department: &str,
    ) -> Result<Account, sea_orm::DbErr> {
        self.user_repo()
            .create(username, password_hash, role, department)
            .await
    }

    pub async fn update_account(
        &self,
        id: &str,
        changes: AccountChanges,
    ) -> Result<GuardedWrite<Account>, sea_orm::DbErr> {
        self.user_repo().update(id, changes).await
    }

    pub async fn delete_account(&self, id: &str) -> Result<GuardedWrite<()>, sea_orm::DbErr> {
        self.user_repo().delete(id).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, security)
            .await
    }
}
