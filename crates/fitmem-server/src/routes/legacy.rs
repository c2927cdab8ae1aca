//! Legacy Profile Routes - Denormalized aggregate lists for older clients

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::error_response;
use crate::application::LegacyProfile;
use crate::AppState;

/// Read the four legacy aggregate lists
#[utoipa::path(
    get,
    path = "/fitmem/users/{user_id}/legacy-profile",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Legacy aggregate lists", body = LegacyProfile),
        (status = 500, description = "Internal server error")
    ),
    tag = "Legacy"
)]
pub async fn get_legacy_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LegacyProfile>, (StatusCode, String)> {
    let profile = state
        .memory_service
        .legacy_profile(&user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(profile))
}

/// Rebuild the legacy aggregate lists from the memory records
#[utoipa::path(
    post,
    path = "/fitmem/users/{user_id}/legacy-profile/reconcile",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Rebuilt aggregate lists", body = LegacyProfile),
        (status = 500, description = "Internal server error")
    ),
    tag = "Legacy"
)]
pub async fn reconcile_legacy_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LegacyProfile>, (StatusCode, String)> {
    let profile = state
        .memory_service
        .reconcile_legacy_aggregates(&user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(profile))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fitmem/users/:user_id/legacy-profile", get(get_legacy_profile))
        .route(
            "/fitmem/users/:user_id/legacy-profile/reconcile",
            post(reconcile_legacy_profile),
        )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_user_has_empty_lists() {
        let (_, app) = app();
        let (status, body) = send(&app, "GET", "/fitmem/users/ghost/legacy-profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "preferredExerciseTypes": [],
                "avoidedExerciseTypes": [],
                "preferredMealTypes": [],
                "avoidedMealIngredients": []
            })
        );
    }

    #[tokio::test]
    async fn test_profile_tracks_deletions() {
        let (state, app) = app();
        let squats = state
            .memory_service
            .record_completed_exercise("u1", "Squats")
            .await
            .unwrap()
            .into_record();
        state
            .memory_service
            .record_skipped_exercise("u1", "Burpees")
            .await
            .unwrap();

        let (_, body) = send(&app, "GET", "/fitmem/users/u1/legacy-profile", None).await;
        assert_eq!(body["preferredExerciseTypes"], json!(["Squats"]));
        assert_eq!(body["avoidedExerciseTypes"], json!(["Burpees"]));

        let uri = format!("/fitmem/users/u1/memories/{}", squats.id);
        send(&app, "DELETE", &uri, None).await;

        let (_, body) = send(&app, "GET", "/fitmem/users/u1/legacy-profile", None).await;
        assert_eq!(body["preferredExerciseTypes"], json!([]));
    }

    #[tokio::test]
    async fn test_reconcile_returns_rebuilt_lists() {
        let (state, app) = app();
        state
            .memory_service
            .record_completed_meal("u1", "Oatmeal")
            .await
            .unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/fitmem/users/u1/legacy-profile/reconcile",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preferredMealTypes"], json!(["Oatmeal"]));
    }
}
