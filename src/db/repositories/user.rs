use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::users;

/// Account data returned from repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub role: String,
    pub department: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for Account {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            department: model.department,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Columns an admin may change on an account. `password_hash` is already
/// hashed by the caller.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
}

/// Result of a write that refuses to touch administrator rows.
#[derive(Debug, PartialEq, Eq)]
pub enum GuardedWrite<T> {
    Done(T),
    NotFound,
    Protected,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn list(&self) -> Result<Vec<Account>, DbErr> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Account>, DbErr> {
        let user = users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;

        Ok(user.map(Account::from))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(Account::from))
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: String,
        role: Role,
        department: &str,
    ) -> Result<Account, DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            department: Set(department.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active.insert(&self.conn).await?;
        Ok(Account::from(model))
    }

    /// Applies `changes` to the account `id` unless it is an `admin` row.
    ///
    /// The role guard is part of the `UPDATE` itself, so a promotion that
    /// commits after the caller's own role check still blocks the write.
    pub async fn update(
        &self,
        id: &str,
        changes: AccountChanges,
    ) -> Result<GuardedWrite<Account>, DbErr> {
        let mut query = users::Entity::update_many()
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::Role.ne(Role::Admin.as_str()));

        if let Some(username) = changes.username {
            query = query.col_expr(users::Column::Username, Expr::value(username));
        }
        if let Some(hash) = changes.password_hash {
            query = query.col_expr(users::Column::PasswordHash, Expr::value(hash));
        }
        if let Some(role) = changes.role {
            query = query.col_expr(users::Column::Role, Expr::value(role.as_str()));
        }
        if let Some(department) = changes.department {
            query = query.col_expr(users::Column::Department, Expr::value(department));
        }

        let result = query.exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return self.classify_miss(id).await;
        }

        Ok(self
            .get_by_id(id)
            .await?
            .map_or(GuardedWrite::NotFound, GuardedWrite::Done))
    }

    /// Removes the account `id` unless it is an `admin` row.
    pub async fn delete(&self, id: &str) -> Result<GuardedWrite<()>, DbErr> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::Role.ne(Role::Admin.as_str()))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return self.classify_miss(id).await;
        }
        Ok(GuardedWrite::Done(()))
    }

    async fn classify_miss<T>(&self, id: &str) -> Result<GuardedWrite<T>, DbErr> {
        Ok(match self.get_by_id(id).await? {
            Some(_) => GuardedWrite::Protected,
            None => GuardedWrite::NotFound,
        })
    }

    /// Verify password for a user. Returns the account on success.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| Account::from(user)))
    }

    /// Update password for a user (hashes the new password)
    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {username}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hashes on a blocking thread so request handlers never stall the runtime.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    // Params are read back from the PHC string, so the default instance
    // verifies hashes made with any cost settings.
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random password for the bootstrap account (24 alphanumerics)
#[must_use]
pub fn generate_password() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse", &fast_config()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_hash("correct horse", &hash).unwrap());
        assert!(!verify_password_hash("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let config = fast_config();
        let a = hash_password("same", &config).unwrap();
        let b = hash_password("same", &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_password() {
        let password = generate_password();
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
