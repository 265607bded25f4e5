use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

// ============================================================================
// Action Helpers
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.body.clone()).unwrap()
    }

    /// Field names listed in a validation error body
    pub fn rejected_fields(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e["field"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[allow(dead_code)]
impl TestApp {
    /// Send a request through the full router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Register an account and return its bearer token
    pub async fn sign_up(&self, email: &str) -> String {
        let credentials = json!({ "email": email, "password": "correct-horse" });

        let registered = self
            .post("/api/auth/register", None, credentials.clone())
            .await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self.post("/api/auth/login", None, credentials).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["token"].as_str().unwrap().to_string()
    }

    pub async fn save_draft(&self, token: &str, body: Value) -> TestResponse {
        self.post("/api/my-sessions/save-draft", Some(token), body)
            .await
    }

    pub async fn publish(&self, token: &str, body: Value) -> TestResponse {
        self.post("/api/my-sessions/publish", Some(token), body)
            .await
    }

    pub async fn list_published(&self) -> TestResponse {
        self.get("/api/sessions", None).await
    }

    pub async fn list_mine(&self, token: &str) -> TestResponse {
        self.get("/api/my-sessions", Some(token)).await
    }

    pub async fn get_mine(&self, token: &str, session_id: &str) -> TestResponse {
        self.get(&format!("/api/my-sessions/{}", session_id), Some(token))
            .await
    }
}
