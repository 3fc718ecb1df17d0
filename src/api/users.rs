//! Account administration endpoints. Admin only.
//!
//! Update and delete resolve the target's current role before asking the gate,
//! so administrator rows are refused as protected. The writes themselves also
//! skip admin rows, which covers a promotion landing between check and write.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::{CurrentActor, require};
use super::validation::validate_id;
use super::{
    AccountDto, ApiError, ApiResponse, AppState, CreateAccountRequest, MessageResponse,
    UpdateAccountRequest,
};
use crate::domain::Role;
use crate::services::{AccountError, Action, DenyReason};

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => Self::validation(msg),
            AccountError::NotFound(id) => Self::not_found("User", id),
            AccountError::Conflict(msg) => Self::Conflict(msg),
            AccountError::Protected(id) => {
                tracing::warn!(account_id = %id, "Refused write to administrator account");
                Self::from(DenyReason::ProtectedTarget)
            }
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::StorageUnavailable(msg) => Self::StorageUnavailable(msg),
            AccountError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    require(&actor, Action::ListAccounts)?;
    let accounts = state.accounts().list().await?;
    Ok(Json(ApiResponse::success(accounts)))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AccountDto>>), ApiError> {
    require(&actor, Action::CreateAccount)?;
    let Json(request) = payload?;

    let account = state.accounts().create(&request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    // Role check first so non-admins cannot learn which ids exist.
    require(&actor, Action::UpdateAccount { target: Role::User })?;
    let id = validate_id(&id)?;

    let target = state.accounts().role_of(id).await?;
    require(&actor, Action::UpdateAccount { target })?;

    let Json(request) = payload?;
    let account = state.accounts().update(id, &request).await?;
    Ok(Json(ApiResponse::success(account)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require(&actor, Action::DeleteAccount { target: Role::User })?;
    let id = validate_id(&id)?;

    let target = state.accounts().role_of(id).await?;
    require(&actor, Action::DeleteAccount { target })?;

    state.accounts().delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted successfully",
    ))))
}
