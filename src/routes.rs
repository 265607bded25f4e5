use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, session, shared::AppState};

/// Builds the full HTTP surface. Routes under `/api/my-sessions` require a bearer token.
pub fn app_router(state: AppState) -> Router {
    let owner_routes = Router::new()
        .route("/api/my-sessions", get(session::list_my_sessions))
        .route("/api/my-sessions/save-draft", post(session::save_draft))
        .route("/api/my-sessions/publish", post(session::publish))
        .route("/api/my-sessions/:id", get(session::get_my_session))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    Router::new()
        .route("/", get(|| async { "Wellness Sessions API is running" }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/sessions", get(session::list_published_sessions))
        .merge(owner_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
