use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::SessionModel, service::SessionService, types::SessionRequest};
use crate::auth::AuthUser;
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> SessionService {
    SessionService::new(Arc::clone(&state.session_repository))
}

/// HTTP handler for the public listing
///
/// GET /api/sessions
/// Returns published sessions from every owner, newest first. No authentication.
#[instrument(name = "list_published_sessions", skip(state))]
pub async fn list_published_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionModel>>, AppError> {
    let sessions = service(&state).list_published().await?;
    Ok(Json(sessions))
}

/// GET /api/my-sessions
#[instrument(name = "list_my_sessions", skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_my_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<SessionModel>>, AppError> {
    let sessions = service(&state).list_mine(&user.user_id).await?;
    Ok(Json(sessions))
}

/// GET /api/my-sessions/:id
#[instrument(name = "get_my_session", skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_my_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionModel>, AppError> {
    let session = service(&state).get_mine(&user.user_id, &session_id).await?;
    Ok(Json(session))
}

/// HTTP handler for saving a draft
///
/// POST /api/my-sessions/save-draft
/// Creates a draft when no ID is given, otherwise overwrites the caller's session as a draft
#[instrument(name = "save_draft", skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<SessionModel>, AppError> {
    let Json(request) = payload?;

    let session = service(&state).save_draft(&user.user_id, request).await?;
    info!(session_id = %session.id, "Draft saved");

    Ok(Json(session))
}

/// HTTP handler for publishing
///
/// POST /api/my-sessions/publish
#[instrument(name = "publish", skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn publish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<SessionModel>, AppError> {
    let Json(request) = payload?;

    let session = service(&state).publish(&user.user_id, request).await?;
    info!(session_id = %session.id, "Session published");

    Ok(Json(session))
}
