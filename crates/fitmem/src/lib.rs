//! Fitmem Domain Library
//!
//! Core domain types and interfaces for the fitness personalization memory.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: `MemoryRecord` and its flat document codec
//!   - `value_objects/`: `MemoryKind`, `MemorySource`, `LegacyField`
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `RecordStore`: per-user document collection with field merges
//!
//! # Usage
//!
//! ```rust,ignore
//! use fitmem::{MemoryKind, MemoryRecord, MemorySource, RecordStore};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    decode_timestamp, keys, reinforcement_fields, DomainError, Document, LegacyField, MemoryKind,
    MemoryRecord, MemorySource, MAX_CONFIDENCE, REINFORCEMENT_STEP, SEED_CONFIDENCE,
};
pub use ports::{
    apply_field_updates, FieldFilter, FieldOp, FieldUpdates, RecordStore, StoredDocument,
};
