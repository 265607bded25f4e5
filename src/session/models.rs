use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Lifecycle state of a wellness session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    Published,
}

/// Mutable fields of a session after validation and trimming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFields {
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub resource_url: String,
}

/// Database model for the sessions table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionModel {
    pub id: String,       // UUID v4 as string, assigned on creation
    pub owner_id: String, // User who created the session, never reassigned
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub resource_url: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionModel {
    /// Creates a new session owned by `owner_id` with a generated ID
    pub fn new(owner_id: String, fields: SessionFields, status: SessionStatus) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title: fields.title,
            tags: fields.tags,
            content: fields.content,
            resource_url: fields.resource_url,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field and refreshes `updated_at`.
    /// `id`, `owner_id` and `created_at` are left untouched.
    pub fn overwrite(&mut self, fields: SessionFields, status: SessionStatus) {
        self.title = fields.title;
        self.tags = fields.tags;
        self.content = fields.content;
        self.resource_url = fields.resource_url;
        self.status = status;
        self.touch();
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at).max(self.updated_at);
    }

    pub fn is_published(&self) -> bool {
        self.status == SessionStatus::Published
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Newest first by `updated_at`, then `created_at`, then ascending `id`
pub fn recency_order(a: &SessionModel, b: &SessionModel) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
