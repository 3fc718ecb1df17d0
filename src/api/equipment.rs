//! Equipment API endpoints.
//!
//! Reads are public. Mutations require the `user` role and are delegated to
//! [`EquipmentService`](crate::services::EquipmentService), which writes the
//! matching history entry in the same transaction.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentActor, require};
use super::validation::{validate_id, validate_limit};
use super::{ApiError, ApiResponse, AppState, EquipmentDto, HistoryEntryDto, MessageResponse};
use crate::domain::equipment::EquipmentInput;
use crate::services::{Action, EquipmentError};

impl From<EquipmentError> for ApiError {
    fn from(err: EquipmentError) -> Self {
        match err {
            EquipmentError::Validation(msg) => Self::validation(msg),
            EquipmentError::NotFound(id) => Self::not_found("Equipment", id),
            EquipmentError::Conflict(msg) => Self::Conflict(msg),
            EquipmentError::Database(msg) => Self::DatabaseError(msg),
            EquipmentError::StorageUnavailable(msg) => Self::StorageUnavailable(msg),
            EquipmentError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

/// GET /equipment
pub async fn list_equipment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<Vec<EquipmentDto>>>, ApiError> {
    require(&actor, Action::ReadEquipment)?;
    let items = state.equipment().list().await?;
    Ok(Json(ApiResponse::success(items)))
}

/// GET /equipment/{id}
pub async fn get_equipment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EquipmentDto>>, ApiError> {
    require(&actor, Action::ReadEquipment)?;
    let id = validate_id(&id)?;
    let item = state.equipment().get(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// POST /equipment
pub async fn create_equipment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<EquipmentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<EquipmentDto>>), ApiError> {
    require(&actor, Action::CreateEquipment)?;
    let Json(input) = payload?;

    let created = state.equipment().create(&actor, &input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// PUT /equipment/{id}
pub async fn update_equipment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    payload: Result<Json<EquipmentInput>, JsonRejection>,
) -> Result<Json<ApiResponse<EquipmentDto>>, ApiError> {
    require(&actor, Action::UpdateEquipment)?;
    let id = validate_id(&id)?;
    let Json(input) = payload?;

    let updated = state.equipment().update(&actor, id, &input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /equipment/{id}
pub async fn delete_equipment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require(&actor, Action::DeleteEquipment)?;
    let id = validate_id(&id)?;

    state.equipment().delete(&actor, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Equipment deleted successfully",
    ))))
}

/// GET /equipment/{id}/history
pub async fn equipment_history(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryDto>>>, ApiError> {
    require(&actor, Action::ReadHistory)?;
    let id = validate_id(&id)?;
    let entries = state.equipment().history_for(id).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// GET /history
///
/// Whole audit log, newest first. `?limit=` caps the number of entries.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryDto>>>, ApiError> {
    require(&actor, Action::ReadHistory)?;

    let entries = match query.limit {
        Some(limit) => {
            let limit = validate_limit(limit)?;
            state.equipment().recent_history(limit).await?
        }
        None => state.equipment().history().await?,
    };
    Ok(Json(ApiResponse::success(entries)))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    require(&actor, Action::ReadCatalog)?;
    let categories = state.equipment().categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /locations
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    require(&actor, Action::ReadCatalog)?;
    let locations = state.equipment().locations().await?;
    Ok(Json(ApiResponse::success(locations)))
}
