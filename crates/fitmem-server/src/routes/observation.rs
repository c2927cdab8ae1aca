//! Observation Routes - Typed recorders for app events

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use fitmem::{DomainError, MemoryKind};

use super::error_response;
use crate::application::Observed;
use crate::models::{ObservationOutcome, ObservationRequest, ObservationResponse};
use crate::AppState;

fn outcome(value: String, result: Result<Observed, DomainError>) -> ObservationOutcome {
    match result {
        Ok(observed) => ObservationOutcome {
            value,
            created: Some(observed.is_created()),
            memory: Some(observed.into_record().into()),
            error: None,
        },
        Err(e) => ObservationOutcome {
            value,
            created: None,
            memory: None,
            error: Some(e.to_string()),
        },
    }
}

/// Record an app event as one or more memories
///
/// Skipped ingredients are recorded one by one; a failure on one ingredient
/// is reported in its outcome and does not undo the others.
#[utoipa::path(
    post,
    path = "/fitmem/users/{user_id}/observations",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = ObservationRequest,
    responses(
        (status = 200, description = "Observation recorded", body = ObservationResponse),
        (status = 400, description = "Invalid kind or value"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Memory"
)]
pub async fn record_observation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ObservationRequest>,
) -> Result<Json<ObservationResponse>, (StatusCode, String)> {
    let service = &state.memory_service;

    let single = match payload {
        ObservationRequest::CompletedExercise { exercise } => {
            let result = service.record_completed_exercise(&user_id, &exercise).await;
            (exercise, result)
        }
        ObservationRequest::SkippedExercise { exercise } => {
            let result = service.record_skipped_exercise(&user_id, &exercise).await;
            (exercise, result)
        }
        ObservationRequest::CompletedMeal { meal } => {
            let result = service.record_completed_meal(&user_id, &meal).await;
            (meal, result)
        }
        ObservationRequest::ConversationPreference { kind, value } => {
            let kind: MemoryKind = kind
                .parse()
                .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
            let result = service
                .record_conversation_preference(&user_id, kind, &value)
                .await;
            (value, result)
        }
        ObservationRequest::ActivityPattern { pattern } => {
            let result = service.record_activity_pattern(&user_id, &pattern).await;
            (pattern, result)
        }
        ObservationRequest::SkippedIngredients { ingredients } => {
            let results = service
                .record_skipped_ingredients(&user_id, &ingredients)
                .await;
            let results = ingredients
                .into_iter()
                .zip(results)
                .map(|(value, result)| outcome(value, result))
                .collect();
            return Ok(Json(ObservationResponse { results }));
        }
    };

    let (value, result) = single;
    let observed = result.map_err(error_response)?;
    Ok(Json(ObservationResponse {
        results: vec![outcome(value, Ok(observed))],
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/fitmem/users/:user_id/observations",
        post(record_observation),
    )
}
