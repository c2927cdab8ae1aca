//! Fitmem API Routes
//!
//! - /fitmem/users/:user_id/memories - Memory records (list, observe, delete, wipe)
//! - /fitmem/users/:user_id/observations - Typed observations from the app
//! - /fitmem/users/:user_id/legacy-profile - Legacy aggregate lists
//! - /fitmem/users/:user_id/memories/events - Creation stream (SSE)

use axum::http::StatusCode;

use fitmem::DomainError;

pub mod events;
pub mod legacy;
pub mod memory;
pub mod observation;
pub mod swagger;

/// Map a domain error onto an HTTP status
pub(crate) fn error_response(e: DomainError) -> (StatusCode, String) {
    match e {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        DomainError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::adapters::InMemoryRecordStore;
    use crate::application::{MemoryEvents, MemoryService};
    use crate::AppState;

    pub fn app() -> (AppState, Router) {
        let store = Arc::new(InMemoryRecordStore::new());
        let state = AppState {
            memory_service: Arc::new(MemoryService::new(store, MemoryEvents::default())),
        };
        (state.clone(), crate::app(state))
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }
}
