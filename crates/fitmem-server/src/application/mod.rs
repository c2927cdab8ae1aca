//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! the record store, the legacy projection, and change notifications.

mod legacy_projector;
mod memory_events;
mod memory_service;

pub use legacy_projector::LegacyProfile;
pub use memory_events::{MemoryEvents, DEFAULT_EVENT_CAPACITY};
pub use memory_service::{MemoryService, Observed};
