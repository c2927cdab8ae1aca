//! Legacy Aggregate Projector
//!
//! Keeps the four denormalized list fields on the user profile in step with
//! the memory records. The record collection stays authoritative; these
//! writes are best effort.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use fitmem::{
    DomainError, Document, FieldOp, FieldUpdates, LegacyField, MemoryKind, MemoryRecord,
    RecordStore,
};

/// Direction of a projection write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOp {
    Add,
    Remove,
}

/// Decoded legacy aggregate lists for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProfile {
    pub preferred_exercise_types: Vec<String>,
    pub avoided_exercise_types: Vec<String>,
    pub preferred_meal_types: Vec<String>,
    pub avoided_meal_ingredients: Vec<String>,
}

impl LegacyProfile {
    /// Read the aggregate fields from a profile document. Missing or
    /// malformed fields read as empty lists.
    pub fn from_document(doc: &Document) -> Self {
        let list = |field: LegacyField| -> Vec<String> {
            doc.get(field.field_name())
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            preferred_exercise_types: list(LegacyField::PreferredExerciseTypes),
            avoided_exercise_types: list(LegacyField::AvoidedExerciseTypes),
            preferred_meal_types: list(LegacyField::PreferredMealTypes),
            avoided_meal_ingredients: list(LegacyField::AvoidedMealIngredients),
        }
    }

    pub fn field(&self, field: LegacyField) -> &[String] {
        match field {
            LegacyField::PreferredExerciseTypes => &self.preferred_exercise_types,
            LegacyField::AvoidedExerciseTypes => &self.avoided_exercise_types,
            LegacyField::PreferredMealTypes => &self.preferred_meal_types,
            LegacyField::AvoidedMealIngredients => &self.avoided_meal_ingredients,
        }
    }

    pub fn is_empty(&self) -> bool {
        LegacyField::ALL.iter().all(|f| self.field(*f).is_empty())
    }
}

/// Writes memory values into the legacy aggregate fields
pub struct LegacyAggregateProjector<S: RecordStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RecordStore + ?Sized> LegacyAggregateProjector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Union or remove `value` in the field mapped from `kind`.
    ///
    /// Unmapped kinds are a silent no-op.
    pub async fn project(
        &self,
        user_id: &str,
        kind: &MemoryKind,
        value: &str,
        op: ProjectionOp,
    ) -> Result<(), DomainError> {
        let Some(field) = kind.legacy_field() else {
            return Ok(());
        };

        let values = vec![Value::String(value.to_string())];
        let field_op = match op {
            ProjectionOp::Add => FieldOp::ArrayUnion(values),
            ProjectionOp::Remove => FieldOp::ArrayRemove(values),
        };

        let mut updates = FieldUpdates::new();
        updates.insert(field.field_name().to_string(), field_op);
        self.store.merge_fields(user_id, updates).await?;

        tracing::debug!("Projected {:?} '{}' on {} for {}", op, value, field, user_id);
        Ok(())
    }

    /// Overwrite all four fields with empty lists in one merge write
    pub async fn reset(&self, user_id: &str) -> Result<(), DomainError> {
        let updates = LegacyField::ALL
            .iter()
            .map(|field| {
                (
                    field.field_name().to_string(),
                    FieldOp::Set(Value::Array(Vec::new())),
                )
            })
            .collect();
        self.store.merge_fields(user_id, updates).await
    }

    /// Overwrite all four fields with the distinct mapped values of `records`,
    /// keeping the order in which they appear
    pub async fn rebuild(
        &self,
        user_id: &str,
        records: &[MemoryRecord],
    ) -> Result<LegacyProfile, DomainError> {
        let mut profile = LegacyProfile::default();
        for record in records {
            let Some(field) = record.kind.legacy_field() else {
                continue;
            };
            let list = match field {
                LegacyField::PreferredExerciseTypes => &mut profile.preferred_exercise_types,
                LegacyField::AvoidedExerciseTypes => &mut profile.avoided_exercise_types,
                LegacyField::PreferredMealTypes => &mut profile.preferred_meal_types,
                LegacyField::AvoidedMealIngredients => &mut profile.avoided_meal_ingredients,
            };
            if !list.contains(&record.value) {
                list.push(record.value.clone());
            }
        }

        let updates = LegacyField::ALL
            .iter()
            .map(|field| {
                let values = profile
                    .field(*field)
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect();
                (field.field_name().to_string(), FieldOp::Set(Value::Array(values)))
            })
            .collect();
        self.store.merge_fields(user_id, updates).await?;

        Ok(profile)
    }

    /// Current aggregate lists
    pub async fn read(&self, user_id: &str) -> Result<LegacyProfile, DomainError> {
        Ok(self
            .store
            .get_profile(user_id)
            .await?
            .map(|doc| LegacyProfile::from_document(&doc))
            .unwrap_or_default())
    }
}
