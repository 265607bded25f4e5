use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{normalize_email, UserModel},
    password::PasswordHasher,
    repository::UserRepository,
    token::TokenConfig,
    types::{AuthUser, CredentialsRequest, TokenResponse},
};
use crate::shared::{AppError, AppState, FieldError};

const MIN_PASSWORD_LENGTH: usize = 6;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Account registration, login, and bearer token verification
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    password_hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            token_config,
            password_hasher,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
            state.password_hasher,
        )
    }

    /// Registers a new account with a hashed password
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: CredentialsRequest) -> Result<UserModel, AppError> {
        let (email, password) = validate_credentials(&request, true)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            warn!("Registration attempted for existing email");
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.password_hasher.hash(&password).await?;
        let user = UserModel::new(&email, password_hash);
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues a token. Unknown email and wrong password
    /// produce the same error.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: CredentialsRequest) -> Result<TokenResponse, AppError> {
        let (email, password) = validate_credentials(&request, false)?;

        let Some(user) = self.repository.find_by_email(&email).await? else {
            warn!("Login attempted for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self
            .password_hasher
            .verify(&password, &user.password_hash)
            .await?
        {
            warn!(user_id = %user.id, "Login attempted with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.token_config.create_token(&user.id, &user.email)?;
        info!(user_id = %user.id, "User logged in");
        Ok(TokenResponse { token })
    }

    /// Resolves a bearer token to the caller's identity
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        self.token_config.validate_token(token).map(AuthUser::from)
    }
}

/// Loose structural email check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

fn validate_credentials(
    request: &CredentialsRequest,
    registering: bool,
) -> Result<(String, String), AppError> {
    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password = request.password.clone().unwrap_or_default();

    let mut errors = Vec::new();
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if registering && password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters long",
        ));
    } else if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok((email, password))
    } else {
        Err(AppError::Validation(errors))
    }
}
