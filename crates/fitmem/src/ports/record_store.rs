//! Record Store Port
//!
//! Capability interface over a remote per-user document collection.
//! Each user owns a collection of memory documents plus one profile
//! document that carries the legacy aggregate fields.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::{errors::DomainError, Document};

/// A raw document together with its storage key
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// Equality filter on a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Field-level write operator for profile merges
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Overwrite the field
    Set(Value),
    /// Append values not already present
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of the values
    ArrayRemove(Vec<Value>),
}

impl FieldOp {
    /// Apply this operator to the current field value.
    ///
    /// A missing or non-array field is treated as an empty array by the
    /// array operators.
    pub fn apply(&self, current: Option<Value>) -> Value {
        match self {
            FieldOp::Set(value) => value.clone(),
            FieldOp::ArrayUnion(values) => {
                let mut items = as_array(current);
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                Value::Array(items)
            }
            FieldOp::ArrayRemove(values) => {
                let mut items = as_array(current);
                items.retain(|item| !values.contains(item));
                Value::Array(items)
            }
        }
    }
}

fn as_array(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Ordered field name -> operator map for one merge write
pub type FieldUpdates = BTreeMap<String, FieldOp>;

/// Apply a merge write to a document in place
pub fn apply_field_updates(doc: &mut Document, updates: &FieldUpdates) {
    for (field, op) in updates {
        let next = op.apply(doc.remove(field));
        doc.insert(field.clone(), next);
    }
}

/// Repository interface for per-user memory documents
///
/// Implementations guarantee single-document atomicity for every write and
/// all-or-nothing semantics for `batch_delete`. No in-process locking is
/// expected from callers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Documents matching all filters, newest `created_at` first
    async fn query(
        &self,
        user_id: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredDocument>, DomainError>;

    /// Find a document by storage key
    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Document>, DomainError>;

    /// Insert or replace a document
    async fn set(&self, user_id: &str, id: &str, document: Document) -> Result<(), DomainError>;

    /// Overwrite the given top-level fields of an existing document
    ///
    /// Returns `NotFound` when the document does not exist.
    async fn update(&self, user_id: &str, id: &str, fields: Document)
        -> Result<(), DomainError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError>;

    /// Delete several documents atomically
    async fn batch_delete(&self, user_id: &str, ids: &[String]) -> Result<(), DomainError>;

    /// Merge field operators into the user's profile document, creating it
    /// when absent
    async fn merge_fields(&self, user_id: &str, updates: FieldUpdates)
        -> Result<(), DomainError>;

    /// Read the user's profile document
    async fn get_profile(&self, user_id: &str) -> Result<Option<Document>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_union_skips_existing_values() {
        let op = FieldOp::ArrayUnion(vec![json!("Squats")]);
        let once = op.apply(None);
        let twice = op.apply(Some(once));
        assert_eq!(twice, json!(["Squats"]));
    }

    #[test]
    fn test_array_remove_drops_all_occurrences() {
        let op = FieldOp::ArrayRemove(vec![json!("Lunges")]);
        let next = op.apply(Some(json!(["Lunges", "Squats", "Lunges"])));
        assert_eq!(next, json!(["Squats"]));
    }

    #[test]
    fn test_array_ops_replace_non_array_values() {
        let op = FieldOp::ArrayUnion(vec![json!("Rice")]);
        assert_eq!(op.apply(Some(json!("Rice"))), json!(["Rice"]));
    }

    #[test]
    fn test_apply_field_updates_leaves_other_fields() {
        let mut doc = Document::new();
        doc.insert("displayName".into(), json!("Sam"));
        doc.insert("preferredMealTypes".into(), json!(["Oatmeal"]));

        let mut updates = FieldUpdates::new();
        updates.insert("preferredMealTypes".into(), FieldOp::Set(json!([])));
        updates.insert(
            "avoidedMealIngredients".into(),
            FieldOp::ArrayUnion(vec![json!("cilantro")]),
        );
        apply_field_updates(&mut doc, &updates);

        assert_eq!(doc["displayName"], json!("Sam"));
        assert_eq!(doc["preferredMealTypes"], json!([]));
        assert_eq!(doc["avoidedMealIngredients"], json!(["cilantro"]));
    }

    #[test]
    fn test_field_filter_matches_exact_value() {
        let mut doc = Document::new();
        doc.insert("type".into(), json!("preferredMeal"));
        assert!(FieldFilter::eq("type", "preferredMeal").matches(&doc));
        assert!(!FieldFilter::eq("type", "avoidedIngredient").matches(&doc));
        assert!(!FieldFilter::eq("value", "Oatmeal").matches(&doc));
    }
}
