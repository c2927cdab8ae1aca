//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::application::LegacyProfile;
use crate::models::{
    MemoryResponse, ObservationOutcome, ObservationRequest, ObservationResponse,
    ObserveMemoryRequest, ObserveMemoryResponse, WipeResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Memory endpoints
        super::memory::list_memories,
        super::memory::observe_memory,
        super::memory::delete_memory,
        super::memory::wipe_memories,
        super::observation::record_observation,
        super::events::memory_events,
        // Legacy endpoints
        super::legacy::get_legacy_profile,
        super::legacy::reconcile_legacy_profile,
    ),
    components(schemas(
        MemoryResponse,
        ObserveMemoryRequest,
        ObserveMemoryResponse,
        ObservationRequest,
        ObservationOutcome,
        ObservationResponse,
        WipeResponse,
        LegacyProfile,
    )),
    tags(
        (name = "Memory", description = "Personalization memories per user"),
        (name = "Legacy", description = "Denormalized aggregate lists for older clients")
    ),
    info(
        title = "Fitmem API",
        version = "0.2.0",
        description = "Personalization memory for fitness coaching"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_memory_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/fitmem/users/{user_id}/memories"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/fitmem/users/{user_id}/legacy-profile/reconcile"));
    }
}
