use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

const USER_EXISTS_MESSAGE: &str = "User already exists";

/// Trait for user account storage
#[async_trait]
pub trait UserRepository {
    /// Stores a new user; fails with `Conflict` when the email is taken
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository, keyed by email
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| AppError::Internal("user store lock poisoned".to_string()))?;

        if users.contains_key(&user.email) {
            warn!(user_id = %user.id, "Email already registered in memory");
            return Err(AppError::Conflict(USER_EXISTS_MESSAGE.to_string()));
        }
        users.insert(user.email.clone(), user.clone());

        debug!(user_id = %user.id, "User created in memory");
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self
            .users
            .lock()
            .map_err(|_| AppError::Internal("user store lock poisoned".to_string()))?;
        Ok(users.get(email).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(user_id = %user.id, "User created in database");
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(user_id = %user.id, "Email already registered in database");
                Err(AppError::Conflict(USER_EXISTS_MESSAGE.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Failed to create user in database");
                Err(AppError::from(e))
            }
        }
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::from(e)
        })?;

        let user = match row {
            Some(row) => Some(UserModel {
                id: row.try_get("id")?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
                created_at: row.try_get("created_at")?,
            }),
            None => None,
        };

        Ok(user)
    }
}
