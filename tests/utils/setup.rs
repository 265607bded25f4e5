use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use wellness_sessions::{
    app_router,
    auth::{
        password::{PasswordHasher, MIN_BCRYPT_COST},
        repository::InMemoryUserRepository,
        token::TokenConfig,
    },
    session::{
        models::{SessionFields, SessionModel, SessionStatus},
        repository::InMemorySessionRepository,
    },
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-secret";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub session_repository: Arc<InMemorySessionRepository>,
    pub token_config: TokenConfig,
}

pub struct TestAppBuilder {
    sessions: Vec<SessionModel>,
}

#[allow(dead_code)]
impl TestAppBuilder {
    pub fn new() -> Self {
        Self { sessions: vec![] }
    }

    /// Seeds a session directly into the store, bypassing the API
    pub fn with_session(self, owner_id: &str, title: &str, status: SessionStatus) -> Self {
        let now = Utc::now();
        self.with_session_at(owner_id, title, status, now, now)
    }

    /// Seeds a session with fixed timestamps
    pub fn with_session_at(
        mut self,
        owner_id: &str,
        title: &str,
        status: SessionStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let fields = SessionFields {
            title: title.to_string(),
            tags: vec![],
            content: String::new(),
            resource_url: "https://cdn.example.com/session.json".to_string(),
        };
        let mut session = SessionModel::new(owner_id.to_string(), fields, status);
        session.created_at = created_at;
        session.updated_at = updated_at;

        self.sessions.push(session);
        self
    }

    pub fn build(self) -> TestApp {
        let session_repository = Arc::new(InMemorySessionRepository::with_sessions(self.sessions));
        let token_config = TokenConfig::new(TEST_SECRET, 2);

        let state = AppState::new(
            session_repository.clone(),
            Arc::new(InMemoryUserRepository::new()),
            token_config.clone(),
            PasswordHasher::new(MIN_BCRYPT_COST),
        );

        TestApp {
            router: app_router(state),
            session_repository,
            token_config,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
