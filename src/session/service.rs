use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{SessionModel, SessionStatus},
    repository::{SessionRepository, UpsertResult},
    types::SessionRequest,
    validation::validate_fields,
};
use crate::shared::AppError;

const NOT_FOUND_MESSAGE: &str = "Session not found";

/// Drives the draft/published lifecycle of wellness sessions.
///
/// Every owner-scoped lookup goes through `find_one` or `upsert` with the
/// caller's ID, so a session belonging to someone else is indistinguishable
/// from one that does not exist.
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Lists published sessions from every owner
    #[instrument(skip(self))]
    pub async fn list_published(&self) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.repository.find_published().await?;
        info!(count = sessions.len(), "Listed published sessions");
        Ok(sessions)
    }

    /// Lists the caller's sessions in any status
    #[instrument(skip(self))]
    pub async fn list_mine(&self, owner_id: &str) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.repository.find_by_owner(owner_id).await?;
        info!(owner_id = %owner_id, count = sessions.len(), "Listed owner sessions");
        Ok(sessions)
    }

    /// Fetches one of the caller's sessions
    #[instrument(skip(self))]
    pub async fn get_mine(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<SessionModel, AppError> {
        self.repository
            .find_one(owner_id, session_id)
            .await?
            .ok_or_else(|| {
                warn!(owner_id = %owner_id, session_id = %session_id, "Session not found for owner");
                AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
            })
    }

    /// Creates a draft, or moves an owned session back to draft with the given fields
    #[instrument(skip(self, request))]
    pub async fn save_draft(
        &self,
        owner_id: &str,
        request: SessionRequest,
    ) -> Result<SessionModel, AppError> {
        self.transition(owner_id, &request, SessionStatus::Draft).await
    }

    /// Creates or updates a session as published; requires a title and resource URL
    #[instrument(skip(self, request))]
    pub async fn publish(
        &self,
        owner_id: &str,
        request: SessionRequest,
    ) -> Result<SessionModel, AppError> {
        self.transition(owner_id, &request, SessionStatus::Published).await
    }

    async fn transition(
        &self,
        owner_id: &str,
        request: &SessionRequest,
        target: SessionStatus,
    ) -> Result<SessionModel, AppError> {
        // Validation runs before the store is touched so a rejected request changes nothing
        let fields = validate_fields(request, target).map_err(|e| {
            warn!(owner_id = %owner_id, target = %target, error = %e, "Rejected session fields");
            e
        })?;

        let session_id = request.target_id();
        match self
            .repository
            .upsert(owner_id, session_id, fields, target)
            .await?
        {
            UpsertResult::Created(session) => {
                info!(session_id = %session.id, status = %session.status, "Session created");
                Ok(session)
            }
            UpsertResult::Updated(session) => {
                info!(session_id = %session.id, status = %session.status, "Session updated");
                Ok(session)
            }
            UpsertResult::NotFound => {
                warn!(
                    owner_id = %owner_id,
                    session_id = ?session_id,
                    "Upsert target not found for owner"
                );
                Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::repository::InMemorySessionRepository;

    fn setup() -> (Arc<InMemorySessionRepository>, SessionService) {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(repo.clone());
        (repo, service)
    }

    fn request(id: Option<&str>, title: &str, resource_url: Option<&str>) -> SessionRequest {
        SessionRequest {
            id: id.map(String::from),
            title: Some(title.to_string()),
            tags: Some(vec![]),
            content: None,
            resource_url: resource_url.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_as_draft() {
        let (_repo, service) = setup();

        let session = service
            .save_draft("alice", request(None, "", None))
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Draft);
        assert_eq!(session.title, "");

        let fetched = service.get_mine("alice", &session.id).await.unwrap();
        assert_eq!(fetched, session);
        assert!(service.list_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_without_title_leaves_store_unchanged() {
        let (repo, service) = setup();

        let result = service
            .publish("alice", request(None, "  ", Some("https://x/y.json")))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_draft() {
        let (repo, service) = setup();
        let draft = service
            .save_draft("alice", request(None, "Intro", None))
            .await
            .unwrap();

        let result = service
            .publish("alice", request(Some(&draft.id), "Intro", None))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.snapshot(&draft.id).unwrap(), draft);
    }

    #[tokio::test]
    async fn test_other_owner_always_gets_not_found() {
        let (repo, service) = setup();
        let session = service
            .publish("alice", request(None, "Intro", Some("https://x/y.json")))
            .await
            .unwrap();

        let get = service.get_mine("bob", &session.id).await;
        let draft = service
            .save_draft("bob", request(Some(&session.id), "Mine now", None))
            .await;
        let publish = service
            .publish(
                "bob",
                request(Some(&session.id), "Mine now", Some("https://x/z.json")),
            )
            .await;

        assert!(matches!(get, Err(AppError::NotFound(_))));
        assert!(matches!(draft, Err(AppError::NotFound(_))));
        assert!(matches!(publish, Err(AppError::NotFound(_))));
        assert_eq!(repo.snapshot(&session.id).unwrap(), session);
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn test_save_draft_is_idempotent() {
        let (repo, service) = setup();
        let created = service
            .save_draft("alice", request(None, "Breathing", None))
            .await
            .unwrap();

        let first = service
            .save_draft("alice", request(Some(&created.id), "Breathing", None))
            .await
            .unwrap();
        let second = service
            .save_draft("alice", request(Some(&created.id), "Breathing", None))
            .await
            .unwrap();

        assert!(second.updated_at >= first.updated_at);
        assert_eq!(
            SessionModel {
                updated_at: first.updated_at,
                ..second
            },
            first
        );
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let (repo, service) = setup();
        let created = service
            .save_draft("alice", request(None, "Body scan", None))
            .await
            .unwrap();

        let first = service
            .publish(
                "alice",
                request(Some(&created.id), "Body scan", Some("https://x/scan.json")),
            )
            .await
            .unwrap();
        let second = service
            .publish(
                "alice",
                request(Some(&created.id), "Body scan", Some("https://x/scan.json")),
            )
            .await
            .unwrap();

        assert_eq!(first.status, SessionStatus::Published);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(
            SessionModel {
                updated_at: first.updated_at,
                ..second
            },
            first
        );
        assert_eq!(repo.session_count(), 1);
        assert_eq!(service.list_published().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_omitted_fields() {
        let (_repo, service) = setup();
        let created = service
            .save_draft(
                "alice",
                SessionRequest {
                    title: Some("Yoga".to_string()),
                    tags: Some(vec!["stretch".to_string()]),
                    content: Some("Warm up first".to_string()),
                    ..SessionRequest::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .save_draft(
                "alice",
                SessionRequest {
                    id: Some(created.id.clone()),
                    title: Some("Yoga".to_string()),
                    ..SessionRequest::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.tags.is_empty());
        assert!(updated.content.is_empty());
    }

    #[tokio::test]
    async fn test_publish_then_back_to_draft() {
        let (_repo, service) = setup();
        let published = service
            .publish("alice", request(None, "Intro", Some("https://x/y.json")))
            .await
            .unwrap();
        assert_eq!(service.list_published().await.unwrap().len(), 1);

        let draft = service
            .save_draft("alice", request(Some(&published.id), "Intro", None))
            .await
            .unwrap();

        assert_eq!(draft.id, published.id);
        assert_eq!(draft.status, SessionStatus::Draft);
        assert!(service.list_published().await.unwrap().is_empty());
        assert_eq!(service.list_mine("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_created() {
        let (repo, service) = setup();

        let result = service
            .save_draft("alice", request(Some("does-not-exist"), "x", None))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.session_count(), 0);
    }
}
