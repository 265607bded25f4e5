use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::models::{recency_order, SessionFields, SessionModel, SessionStatus};
use crate::shared::AppError;

/// Result of an upsert-by-identity write
#[derive(Debug, Clone)]
pub enum UpsertResult {
    /// No ID was supplied, a new session was stored
    Created(SessionModel),
    /// The caller's session was overwritten
    Updated(SessionModel),
    /// No session with that ID belongs to the caller
    NotFound,
}

/// Trait for session repository operations.
///
/// List methods return sessions newest first (see [`recency_order`]).
#[async_trait]
pub trait SessionRepository {
    async fn find_published(&self) -> Result<Vec<SessionModel>, AppError>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<SessionModel>, AppError>;

    /// Matches on both owner and ID; a session owned by someone else is `None`
    async fn find_one(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<Option<SessionModel>, AppError>;

    /// Atomically creates (no ID) or overwrites (owned ID) a session.
    /// Never falls back to creating when an ID is supplied.
    async fn upsert(
        &self,
        owner_id: &str,
        session_id: Option<&str>,
        fields: SessionFields,
        status: SessionStatus,
    ) -> Result<UpsertResult, AppError>;
}

/// In-memory implementation of SessionRepository for development and testing.
/// Data is lost when the application restarts.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, SessionModel>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated sessions
    pub fn with_sessions(sessions: Vec<SessionModel>) -> Self {
        let session_map = sessions
            .into_iter()
            .map(|session| (session.id.clone(), session))
            .collect();

        Self {
            sessions: Mutex::new(session_map),
        }
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Returns a stored session by ID regardless of owner
    pub fn snapshot(&self, session_id: &str) -> Option<SessionModel> {
        self.sessions
            .lock()
            .ok()
            .and_then(|s| s.get(session_id).cloned())
    }

    fn store(&self) -> Result<MutexGuard<'_, HashMap<String, SessionModel>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }

    fn collect_sorted<F>(&self, filter: F) -> Result<Vec<SessionModel>, AppError>
    where
        F: Fn(&SessionModel) -> bool,
    {
        let sessions = self.store()?;
        let mut matching: Vec<SessionModel> =
            sessions.values().filter(|&s| filter(s)).cloned().collect();
        matching.sort_by(recency_order);
        Ok(matching)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self))]
    async fn find_published(&self) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.collect_sorted(SessionModel::is_published)?;
        debug!(count = sessions.len(), "Listed published sessions from memory");
        Ok(sessions)
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.collect_sorted(|s| s.is_owned_by(owner_id))?;
        debug!(owner_id = %owner_id, count = sessions.len(), "Listed owner sessions from memory");
        Ok(sessions)
    }

    #[instrument(skip(self))]
    async fn find_one(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<Option<SessionModel>, AppError> {
        let sessions = self.store()?;
        let session = sessions
            .get(session_id)
            .filter(|s| s.is_owned_by(owner_id))
            .cloned();

        match &session {
            Some(_) => debug!(session_id = %session_id, "Session found in memory"),
            None => debug!(session_id = %session_id, "Session not found in memory for owner"),
        }

        Ok(session)
    }

    #[instrument(skip(self, fields))]
    async fn upsert(
        &self,
        owner_id: &str,
        session_id: Option<&str>,
        fields: SessionFields,
        status: SessionStatus,
    ) -> Result<UpsertResult, AppError> {
        let mut sessions = self.store()?;

        let Some(session_id) = session_id else {
            let session = SessionModel::new(owner_id.to_string(), fields, status);
            debug!(session_id = %session.id, status = %status, "Creating session in memory");
            sessions.insert(session.id.clone(), session.clone());
            return Ok(UpsertResult::Created(session));
        };

        match sessions
            .get_mut(session_id)
            .filter(|s| s.is_owned_by(owner_id))
        {
            Some(session) => {
                session.overwrite(fields, status);
                debug!(session_id = %session_id, status = %status, "Session overwritten in memory");
                Ok(UpsertResult::Updated(session.clone()))
            }
            None => {
                warn!(session_id = %session_id, "No session with this ID for owner in memory");
                Ok(UpsertResult::NotFound)
            }
        }
    }
}

const SESSION_COLUMNS: &str =
    "id, owner_id, title, tags, content, resource_url, status, created_at, updated_at";

const RECENCY_ORDER: &str = "ORDER BY updated_at DESC, created_at DESC, id ASC";

/// PostgreSQL implementation of session repository
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: PgRow) -> Result<SessionModel, AppError> {
    let status: String = row.try_get("status")?;
    let status = SessionStatus::from_str(&status)
        .map_err(|_| AppError::DatabaseError(format!("Unknown session status: {}", status)))?;

    Ok(SessionModel {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        tags: row.try_get("tags")?,
        content: row.try_get("content")?,
        resource_url: row.try_get("resource_url")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self))]
    async fn find_published(&self) -> Result<Vec<SessionModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE status = $1 {}",
            SESSION_COLUMNS, RECENCY_ORDER
        ))
        .bind(SessionStatus::Published.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list published sessions");
            AppError::from(e)
        })?;

        debug!(count = rows.len(), "Listed published sessions from database");
        rows.into_iter().map(row_to_session).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<SessionModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE owner_id = $1 {}",
            SESSION_COLUMNS, RECENCY_ORDER
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, owner_id = %owner_id, "Failed to list owner sessions");
            AppError::from(e)
        })?;

        debug!(owner_id = %owner_id, count = rows.len(), "Listed owner sessions from database");
        rows.into_iter().map(row_to_session).collect()
    }

    #[instrument(skip(self))]
    async fn find_one(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<Option<SessionModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE id = $1 AND owner_id = $2",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch session");
            AppError::from(e)
        })?;

        row.map(row_to_session).transpose()
    }

    #[instrument(skip(self, fields))]
    async fn upsert(
        &self,
        owner_id: &str,
        session_id: Option<&str>,
        fields: SessionFields,
        status: SessionStatus,
    ) -> Result<UpsertResult, AppError> {
        let Some(session_id) = session_id else {
            let session = SessionModel::new(owner_id.to_string(), fields, status);
            debug!(session_id = %session.id, status = %status, "Inserting session into database");

            sqlx::query(&format!(
                "INSERT INTO sessions ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                SESSION_COLUMNS
            ))
            .bind(&session.id)
            .bind(&session.owner_id)
            .bind(&session.title)
            .bind(&session.tags)
            .bind(&session.content)
            .bind(&session.resource_url)
            .bind(session.status.as_ref())
            .bind(session.created_at)
            .bind(session.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert session");
                AppError::from(e)
            })?;

            return Ok(UpsertResult::Created(session));
        };

        // Single statement so the ownership check and the write cannot interleave
        let row = sqlx::query(&format!(
            "UPDATE sessions SET title = $3, tags = $4, content = $5, resource_url = $6, \
             status = $7, updated_at = GREATEST($8, created_at, updated_at) \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.tags)
        .bind(&fields.content)
        .bind(&fields.resource_url)
        .bind(status.as_ref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to update session");
            AppError::from(e)
        })?;

        match row {
            Some(row) => {
                debug!(session_id = %session_id, status = %status, "Session overwritten in database");
                Ok(UpsertResult::Updated(row_to_session(row)?))
            }
            None => {
                warn!(session_id = %session_id, "No session with this ID for owner in database");
                Ok(UpsertResult::NotFound)
            }
        }
    }
}
