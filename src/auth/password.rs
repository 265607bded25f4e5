use std::ops::RangeInclusive;

use crate::shared::AppError;

/// Work factors bcrypt accepts
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Cheapest accepted cost, for tests and local development
pub const MIN_BCRYPT_COST: u32 = 4;

/// bcrypt hashing, run on the blocking pool since it is CPU bound
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))
    }
}
