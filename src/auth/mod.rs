// Public API - what other modules can use
pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use types::AuthUser;

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
