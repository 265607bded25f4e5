// Library crate for the wellness sessions API
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod routes;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use auth::AuthUser;
pub use config::AppConfig;
pub use routes::app_router;
pub use session::{SessionModel, SessionRequest, SessionStatus};
pub use shared::{AppError, AppState};
