//! `SeaORM` implementation of the `AccountService` trait.

use crate::api::types::{AccountDto, CreateAccountRequest, UpdateAccountRequest};
use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password_blocking;
use crate::db::{AccountChanges, GuardedWrite, Store};
use crate::domain::Role;
use crate::services::account_service::{AccountError, AccountService};
use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use tracing::info;

const MAX_USERNAME_LENGTH: usize = 64;

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn check_password(&self, password: &str) -> Result<(), AccountError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

fn check_username(username: &str) -> Result<(), AccountError> {
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AccountError::Validation(format!(
            "Username must be {MAX_USERNAME_LENGTH} characters or less"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AccountError::Validation(
            "Username cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}

fn parse_role(role: &str) -> Result<Role, AccountError> {
    role.trim().parse().map_err(AccountError::Validation)
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn conflict_or(err: DbErr, username: Option<&str>) -> AccountError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return AccountError::Conflict(username.map_or_else(
            || "Username already exists".to_string(),
            |u| format!("Username '{u}' already exists"),
        ));
    }
    AccountError::from(err)
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn list(&self) -> Result<Vec<AccountDto>, AccountError> {
        let accounts = self.store.list_accounts().await?;
        Ok(accounts.into_iter().map(AccountDto::from).collect())
    }

    async fn role_of(&self, id: &str) -> Result<Role, AccountError> {
        let account = self
            .store
            .get_account(id)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        account
            .role
            .parse()
            .map_err(|e: String| AccountError::Internal(format!("Corrupt role on {id}: {e}")))
    }

    async fn create(&self, request: &CreateAccountRequest) -> Result<AccountDto, AccountError> {
        let username = non_blank(request.username.as_ref());
        let role = non_blank(request.role.as_ref());
        let department = non_blank(request.department.as_ref());
        let password = request.password.clone().filter(|p| !p.is_empty());

        let (Some(username), Some(password), Some(role), Some(department)) =
            (username, password, role, department)
        else {
            return Err(AccountError::Validation(
                "Missing required fields: username, password, role, department".to_string(),
            ));
        };

        check_username(&username)?;
        self.check_password(&password)?;
        let role = parse_role(&role)?;

        let hash = hash_password_blocking(&password, &self.security).await?;
        let account = self
            .store
            .create_account(&username, hash, role, &department)
            .await
            .map_err(|e| conflict_or(e, Some(&username)))?;

        info!(account_id = %account.id, username = %account.username, role = %account.role, "Account created");
        Ok(AccountDto::from(account))
    }

    async fn update(
        &self,
        id: &str,
        request: &UpdateAccountRequest,
    ) -> Result<AccountDto, AccountError> {
        let mut changes = AccountChanges::default();

        if let Some(username) = non_blank(request.username.as_ref()) {
            check_username(&username)?;
            changes.username = Some(username);
        }
        if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
            self.check_password(password)?;
            changes.password_hash = Some(hash_password_blocking(password, &self.security).await?);
        }
        if let Some(role) = non_blank(request.role.as_ref()) {
            changes.role = Some(parse_role(&role)?);
        }
        if let Some(department) = non_blank(request.department.as_ref()) {
            changes.department = Some(department);
        }

        if changes.username.is_none()
            && changes.password_hash.is_none()
            && changes.role.is_none()
            && changes.department.is_none()
        {
            return Err(AccountError::Validation("No fields to update".to_string()));
        }

        let username = changes.username.clone();
        let account = match self
            .store
            .update_account(id, changes)
            .await
            .map_err(|e| conflict_or(e, username.as_deref()))?
        {
            GuardedWrite::Done(account) => account,
            GuardedWrite::NotFound => return Err(AccountError::NotFound(id.to_string())),
            GuardedWrite::Protected => return Err(AccountError::Protected(id.to_string())),
        };

        info!(account_id = %account.id, username = %account.username, "Account updated");
        Ok(AccountDto::from(account))
    }

    async fn delete(&self, id: &str) -> Result<(), AccountError> {
        match self.store.delete_account(id).await? {
            GuardedWrite::Done(()) => {}
            GuardedWrite::NotFound => return Err(AccountError::NotFound(id.to_string())),
            GuardedWrite::Protected => return Err(AccountError::Protected(id.to_string())),
        }

        info!(account_id = %id, "Account deleted");
        Ok(())
    }
}
