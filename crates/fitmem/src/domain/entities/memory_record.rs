//! MemoryRecord - A single personalization fact about a user
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{MemoryKind, MemorySource};

/// Flat key-value document as exchanged with the record store
pub type Document = serde_json::Map<String, Value>;

/// Confidence assigned on first observation
pub const SEED_CONFIDENCE: f64 = 0.5;
/// Confidence gained per corroborating observation
pub const REINFORCEMENT_STEP: f64 = 0.1;
/// Confidence ceiling
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Document keys
pub mod keys {
    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const VALUE: &str = "value";
    pub const SOURCE: &str = "source";
    pub const CREATED_AT: &str = "created_at";
    pub const CONFIDENCE: &str = "confidence";
}

/// MemoryRecord - An observed preference or aversion with a belief score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Storage key
    pub id: String,
    /// What kind of fact this is
    #[serde(rename = "type")]
    pub kind: MemoryKind,
    /// The observed value ("Squats", "Oatmeal", "cilantro")
    pub value: String,
    /// How the fact was first observed
    pub source: MemorySource,
    /// Last time the fact was observed
    pub created_at: DateTime<Utc>,
    /// Belief score (0.0 - 1.0)
    pub confidence: f64,
}

impl MemoryRecord {
    /// Create a first observation with generated ID and seed confidence
    pub fn new(kind: MemoryKind, value: String, source: MemorySource) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            value,
            source,
            created_at: Utc::now(),
            confidence: SEED_CONFIDENCE,
        }
    }

    /// Confidence after one more corroborating observation
    pub fn reinforced_confidence(&self) -> f64 {
        (self.confidence + REINFORCEMENT_STEP).min(MAX_CONFIDENCE)
    }

    /// Apply a repeated observation. Source is kept as first observed.
    pub fn reinforce(&mut self, observed_at: DateTime<Utc>) {
        self.confidence = self.reinforced_confidence();
        self.created_at = observed_at;
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(keys::ID.into(), Value::String(self.id.clone()));
        doc.insert(keys::TYPE.into(), Value::String(self.kind.to_string()));
        doc.insert(keys::VALUE.into(), Value::String(self.value.clone()));
        doc.insert(keys::SOURCE.into(), Value::String(self.source.to_string()));
        doc.insert(
            keys::CREATED_AT.into(),
            Value::String(self.created_at.to_rfc3339()),
        );
        doc.insert(keys::CONFIDENCE.into(), Value::from(self.confidence));
        doc
    }

    /// Decode a stored document.
    ///
    /// Returns `None` when a required key is missing or unreadable; callers
    /// drop such documents instead of failing the whole read.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let id = doc.get(keys::ID)?.as_str()?.to_string();
        let kind = doc.get(keys::TYPE)?.as_str()?.parse().ok()?;
        let value = doc.get(keys::VALUE)?.as_str()?.to_string();
        let source = doc.get(keys::SOURCE)?.as_str()?.parse().ok()?;
        let created_at = decode_timestamp(doc.get(keys::CREATED_AT)?)?;
        let confidence = doc.get(keys::CONFIDENCE)?.as_f64()?;
        if !confidence.is_finite() {
            return None;
        }

        Some(Self {
            id,
            kind,
            value,
            source,
            created_at,
            confidence: confidence.clamp(0.0, MAX_CONFIDENCE),
        })
    }
}

/// Fields written on reinforcement
pub fn reinforcement_fields(confidence: f64, observed_at: DateTime<Utc>) -> Document {
    let mut doc = Document::new();
    doc.insert(keys::CONFIDENCE.into(), Value::from(confidence));
    doc.insert(
        keys::CREATED_AT.into(),
        Value::String(observed_at.to_rfc3339()),
    );
    doc
}

/// Read a stored timestamp (RFC 3339 string)
pub fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
