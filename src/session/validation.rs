use url::Url;

use super::{
    models::{SessionFields, SessionStatus},
    types::SessionRequest,
};
use crate::shared::{AppError, FieldError};

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Checks that `value` is an absolute http(s)/ftp URL with a host
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Normalises the request fields and applies the rules for the target status.
///
/// Drafts only need a well-formed `resource_url` when one is given. Publishing
/// additionally needs a non-empty title and a non-empty resource URL. Every
/// violation is reported, not just the first.
pub fn validate_fields(
    request: &SessionRequest,
    target: SessionStatus,
) -> Result<SessionFields, AppError> {
    let fields = SessionFields {
        title: trimmed(&request.title),
        tags: request.tags.clone().unwrap_or_default(),
        content: trimmed(&request.content),
        resource_url: trimmed(&request.resource_url),
    };

    let mut errors = Vec::new();

    if target == SessionStatus::Published {
        if fields.title.is_empty() {
            errors.push(FieldError::new("title", "Title is required to publish"));
        }
        if fields.resource_url.is_empty() {
            errors.push(FieldError::new(
                "resource_url",
                "Resource URL is required to publish",
            ));
        }
    }

    if !fields.resource_url.is_empty() && !is_valid_url(&fields.resource_url) {
        errors.push(FieldError::new(
            "resource_url",
            "Resource URL must be a valid URL",
        ));
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}
