use axum::{
    Json,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::request::Parts,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, CurrentUserDto, MessageResponse};
use crate::domain::Actor;
use crate::services::{Action, AuthError, DenyReason, authorize};

/// Session key holding the serialized [`Actor`] written at login.
pub const ACTOR_KEY: &str = "actor";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(serde::Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid username or password".to_string())
            }
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Actor resolution
// ============================================================================

/// Reads the actor stored in the session.
///
/// Never fails: a missing key, a store error or a payload that no longer
/// decodes all resolve to [`Actor::anonymous`].
pub async fn resolve_actor(session: &Session) -> Actor {
    match session.get::<Actor>(ACTOR_KEY).await {
        Ok(Some(actor)) if !actor.is_anonymous() => actor,
        Ok(_) => Actor::anonymous(),
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable session, treating request as anonymous");
            Actor::anonymous()
        }
    }
}

/// Extractor yielding the acting principal for the current request.
///
/// The session actor is checked against the accounts table on every request:
/// a deleted account ends its sessions, and a changed role applies at once.
pub struct CurrentActor(pub Actor);

impl FromRequestParts<Arc<AppState>> for CurrentActor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(Self(Actor::anonymous()));
        };

        let stored = resolve_actor(&session).await;
        if stored.is_anonymous() {
            return Ok(Self(stored));
        }

        let actor = match state.auth().refresh(&stored).await {
            Ok(Some(actor)) => actor,
            Ok(None) => {
                tracing::info!(
                    username = %stored.audit_name(),
                    "Session belongs to a deleted account, discarding it"
                );
                if let Err(e) = session.flush().await {
                    tracing::debug!(error = %e, "Failed to flush stale session");
                }
                Actor::anonymous()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not verify session account, treating request as anonymous");
                Actor::anonymous()
            }
        };

        let span = tracing::Span::current();
        if let Some(username) = actor.username.as_deref() {
            span.record("actor", username);
        }
        if let Some(role) = actor.role {
            span.record("role", role.as_str());
        }
        Ok(Self(actor))
    }
}

/// Runs the authorization gate and turns a denial into the matching error.
pub fn require(actor: &Actor, action: Action) -> Result<(), ApiError> {
    authorize(actor, action).into_result().map_err(|reason| {
        tracing::warn!(
            actor = %actor.audit_name(),
            action = %action,
            reason = %reason,
            "Request denied"
        );
        let kind = match reason {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::WrongRole { .. } => "wrong_role",
            DenyReason::ProtectedTarget => "protected_target",
        };
        metrics::counter!("authorization_denied_total", "reason" => kind).increment(1);
        ApiError::from(reason)
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(payload) = payload?;

    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let actor = state
        .auth()
        .login(payload.username.trim(), &payload.password)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::warn!(username = %payload.username.trim(), "Failed login attempt");
            }
        })?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(ACTOR_KEY, &actor)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let role = actor.role.map(|r| r.as_str().to_string()).unwrap_or_default();
    let username = actor.audit_name();
    tracing::info!(username = %username, role = %role, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse { username, role })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    if let Err(e) = session.flush().await {
        tracing::debug!(error = %e, "Failed to flush session on logout");
    }
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/user
pub async fn current_user(CurrentActor(actor): CurrentActor) -> Json<ApiResponse<CurrentUserDto>> {
    Json(ApiResponse::success(CurrentUserDto::from(&actor)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Some(username) = actor.username.clone().filter(|_| !actor.is_anonymous()) else {
        return Err(ApiError::from(DenyReason::Unauthenticated));
    };
    let Json(payload) = payload?;

    state
        .auth()
        .change_password(&username, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!("Password changed for user: {username}");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}
