use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{CredentialsRequest, MessageResponse, TokenResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for account registration
///
/// POST /api/auth/register
#[instrument(name = "register", skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload?;

    let user = AuthService::from_state(&state).register(request).await?;
    info!(user_id = %user.id, "Registration completed");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// HTTP handler for login
///
/// POST /api/auth/login
/// Returns a bearer token for the session endpoints
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(request) = payload?;

    let response = AuthService::from_state(&state).login(request).await?;
    Ok(Json(response))
}
