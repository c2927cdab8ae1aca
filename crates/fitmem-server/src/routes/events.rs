//! Memory Event Routes - Server-sent stream of newly created memories

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

use crate::models::MemoryResponse;
use crate::AppState;

/// Stream memories created for a user
///
/// Delivery is at most once to listeners connected at creation time.
/// Reinforcements and background activity patterns are never streamed.
#[utoipa::path(
    get,
    path = "/fitmem/users/{user_id}/memories/events",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "text/event-stream of `memory_created` events carrying MemoryResponse")
    ),
    tag = "Memory"
)]
pub async fn memory_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.memory_service.events().receiver());

    let event_stream = stream.filter_map(move |result| {
        let user_id = user_id.clone();
        async move {
            match result {
                Ok(notification) if notification.user_id == user_id => {
                    let json =
                        serde_json::to_string(&MemoryResponse::from(notification.record)).ok()?;
                    Some(Ok(Event::default().event("memory_created").data(json)))
                }
                Ok(_) => None,
                Err(_) => None, // Lagged receiver, skip event
            }
        }
    });

    Sse::new(event_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/fitmem/users/:user_id/memories/events", get(memory_events))
}
