//! Memory Routes - Personalization records per user
//!
//! HTTP handlers that delegate to MemoryService for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use fitmem::{MemoryKind, MemorySource};

use super::error_response;
use crate::models::{
    MemoryListQuery, MemoryResponse, ObserveMemoryRequest, ObserveMemoryResponse, WipeResponse,
};
use crate::AppState;

/// List memories, most recently observed first
#[utoipa::path(
    get,
    path = "/fitmem/users/{user_id}/memories",
    params(
        ("user_id" = String, Path, description = "User ID"),
        MemoryListQuery
    ),
    responses(
        (status = 200, description = "Memories, newest first", body = Vec<MemoryResponse>),
        (status = 400, description = "Invalid kind"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Memory"
)]
pub async fn list_memories(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<MemoryListQuery>,
) -> Result<Json<Vec<MemoryResponse>>, (StatusCode, String)> {
    let records = match query.kind {
        Some(kind) => {
            let kind: MemoryKind = kind
                .parse()
                .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
            state.memory_service.get_by_kind(&user_id, &kind).await
        }
        None => state.memory_service.get_all(&user_id).await,
    }
    .map_err(error_response)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Observe a memory (create or reinforce)
#[utoipa::path(
    post,
    path = "/fitmem/users/{user_id}/memories",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = ObserveMemoryRequest,
    responses(
        (status = 200, description = "Memory created or reinforced", body = ObserveMemoryResponse),
        (status = 400, description = "Invalid kind, source, or value"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Memory"
)]
pub async fn observe_memory(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ObserveMemoryRequest>,
) -> Result<Json<ObserveMemoryResponse>, (StatusCode, String)> {
    let kind: MemoryKind = payload
        .kind
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    let source: MemorySource = payload
        .source
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    let observed = state
        .memory_service
        .add_or_reinforce(
            &user_id,
            kind,
            &payload.value,
            source,
            payload.notify.unwrap_or(true),
        )
        .await
        .map_err(error_response)?;

    Ok(Json(ObserveMemoryResponse {
        created: observed.is_created(),
        memory: observed.into_record().into(),
    }))
}

/// Delete one memory (succeeds when already absent)
#[utoipa::path(
    delete,
    path = "/fitmem/users/{user_id}/memories/{memory_id}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("memory_id" = String, Path, description = "Memory ID")
    ),
    responses(
        (status = 204, description = "Memory deleted"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Memory"
)]
pub async fn delete_memory(
    State(state): State<AppState>,
    Path((user_id, memory_id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .memory_service
        .remove(&user_id, &memory_id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete every memory and empty the legacy aggregates
#[utoipa::path(
    delete,
    path = "/fitmem/users/{user_id}/memories",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "All memories deleted", body = WipeResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Memory"
)]
pub async fn wipe_memories(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WipeResponse>, (StatusCode, String)> {
    let deleted = state
        .memory_service
        .wipe_all(&user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(WipeResponse { deleted }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/fitmem/users/:user_id/memories",
            get(list_memories).post(observe_memory).delete(wipe_memories),
        )
        .route(
            "/fitmem/users/:user_id/memories/:memory_id",
            delete(delete_memory),
        )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_observe_twice_reinforces() {
        let (_, app) = app();
        let body = json!({"type": "preferredMeal", "value": "Oatmeal", "source": "completedMeal"});

        let (status, first) = send(&app, "POST", "/fitmem/users/u1/memories", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["created"], json!(true));
        assert_eq!(first["memory"]["confidence"], json!(0.5));

        let (_, second) = send(&app, "POST", "/fitmem/users/u1/memories", Some(body)).await;
        assert_eq!(second["created"], json!(false));
        assert_eq!(second["memory"]["id"], first["memory"]["id"]);

        let (_, list) = send(&app, "GET", "/fitmem/users/u1/memories", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_source_is_bad_request() {
        let (_, app) = app();
        let body = json!({"type": "preferredMeal", "value": "Oatmeal", "source": "gossip"});
        let (status, _) = send(&app, "POST", "/fitmem/users/u1/memories", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_value_is_bad_request() {
        let (_, app) = app();
        let body = json!({"type": "preferredMeal", "value": " ", "source": "completedMeal"});
        let (status, _) = send(&app, "POST", "/fitmem/users/u1/memories", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_by_kind() {
        let (state, app) = app();
        state.memory_service.record_completed_meal("u1", "Oatmeal").await.unwrap();
        state.memory_service.record_completed_exercise("u1", "Squats").await.unwrap();

        let (status, list) = send(&app, "GET", "/fitmem/users/u1/memories?kind=preferredExercise", None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["type"], json!("preferredExercise"));
        assert_eq!(list[0]["value"], json!("Squats"));
    }

    #[tokio::test]
    async fn test_delete_missing_memory_is_no_content() {
        let (_, app) = app();
        let (status, _) = send(&app, "DELETE", "/fitmem/users/u1/memories/nope", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_wipe_reports_deleted_count() {
        let (state, app) = app();
        state.memory_service.record_completed_meal("u1", "Oatmeal").await.unwrap();
        state.memory_service.record_completed_meal("u1", "Salmon").await.unwrap();

        let (status, body) = send(&app, "DELETE", "/fitmem/users/u1/memories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], json!(2));

        let (_, list) = send(&app, "GET", "/fitmem/users/u1/memories", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }
}
