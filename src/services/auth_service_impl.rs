//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Account, Store};
use crate::domain::{Actor, Role};
use crate::services::auth_service::{AuthError, AuthService};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

fn actor_for(account: Account) -> Result<Actor, AuthError> {
    let role: Role = account.role.parse().map_err(AuthError::Internal)?;
    let department = Some(account.department).filter(|d| !d.is_empty());
    Ok(Actor::authenticated(
        account.id,
        account.username,
        role,
        department,
    ))
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<Actor, AuthError> {
        let account = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        actor_for(account)
    }

    async fn refresh(&self, actor: &Actor) -> Result<Option<Actor>, AuthError> {
        let Some(id) = actor.id.as_deref().filter(|_| !actor.is_anonymous()) else {
            return Ok(Some(Actor::anonymous()));
        };

        match self.store.get_account(id).await? {
            Some(account) => actor_for(account).map(Some),
            None => Ok(None),
        }
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let min = self.security.min_password_length;
        if new_password.chars().count() < min {
            return Err(AuthError::Validation(format!(
                "New password must be at least {min} characters"
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        if self
            .store
            .verify_user_password(username, current_password)
            .await?
            .is_none()
        {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(username, new_password, &self.security)
            .await?;

        Ok(())
    }
}
