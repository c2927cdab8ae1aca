//! Memory - Request/Response DTOs for the HTTP surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use fitmem::MemoryRecord;

/// Memory record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemoryResponse {
    pub id: String,
    /// Memory kind ("preferredExercise", "avoidedIngredient", or a conversation topic)
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    /// Observation source ("completedExercise", "healthKitPattern", ...)
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub confidence: f64,
}

impl From<MemoryRecord> for MemoryResponse {
    fn from(record: MemoryRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind.to_string(),
            value: record.value,
            source: record.source.to_string(),
            created_at: record.created_at,
            confidence: record.confidence,
        }
    }
}

/// Observe a memory directly
#[derive(Debug, Deserialize, ToSchema)]
pub struct ObserveMemoryRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub source: String,
    /// Announce a newly created record (default true)
    #[serde(default)]
    pub notify: Option<bool>,
}

/// Outcome of a single observation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ObserveMemoryResponse {
    /// true when a new record was created, false when reinforced
    pub created: bool,
    pub memory: MemoryResponse,
}

/// Typed observation from the app
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObservationRequest {
    CompletedExercise { exercise: String },
    SkippedExercise { exercise: String },
    CompletedMeal { meal: String },
    SkippedIngredients { ingredients: Vec<String> },
    ConversationPreference {
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },
    ActivityPattern { pattern: String },
}

/// Per-value result of a typed observation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ObservationOutcome {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ObservationResponse {
    pub results: Vec<ObservationOutcome>,
}

/// Optional kind filter for listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemoryListQuery {
    /// Only return memories of this kind
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WipeResponse {
    pub deleted: usize,
}
