use serde::{Deserialize, Serialize};

/// Request payload shared by the save-draft and publish endpoints.
/// Omitted fields are cleared on update since the write is a full replace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionRequest {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "json_file_url")]
    pub resource_url: Option<String>,
}

impl SessionRequest {
    /// The target session ID, with blank values treated as absent
    pub fn target_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
