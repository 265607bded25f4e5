// Public API - what other modules can use
pub use handlers::{get_my_session, list_my_sessions, list_published_sessions, publish, save_draft};
pub use models::{SessionModel, SessionStatus};
pub use types::SessionRequest;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
mod validation;
