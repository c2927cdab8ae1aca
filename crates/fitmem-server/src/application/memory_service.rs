//! Memory Application Service (Use Case)
//!
//! Deduplicates observations into memory records, reinforces confidence on
//! repeats, keeps the legacy aggregates projected, and announces new records.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use fitmem::{
    keys, reinforcement_fields, DomainError, FieldFilter, MemoryKind, MemoryRecord,
    MemorySource, RecordStore, StoredDocument,
};

use super::legacy_projector::{LegacyAggregateProjector, LegacyProfile, ProjectionOp};
use super::memory_events::MemoryEvents;

/// Which branch an observation took
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// First observation of this (kind, value)
    Created(MemoryRecord),
    /// Existing record with raised confidence
    Reinforced(MemoryRecord),
}

impl Observed {
    pub fn record(&self) -> &MemoryRecord {
        match self {
            Observed::Created(record) | Observed::Reinforced(record) => record,
        }
    }

    pub fn into_record(self) -> MemoryRecord {
        match self {
            Observed::Created(record) | Observed::Reinforced(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Observed::Created(_))
    }
}

/// Application service for memory operations
pub struct MemoryService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    projector: LegacyAggregateProjector<S>,
    events: MemoryEvents,
}

impl<S: RecordStore + ?Sized> MemoryService<S> {
    pub fn new(store: Arc<S>, events: MemoryEvents) -> Self {
        Self {
            projector: LegacyAggregateProjector::new(store.clone()),
            store,
            events,
        }
    }

    pub fn events(&self) -> &MemoryEvents {
        &self.events
    }

    /// Record an observation, creating the memory or reinforcing it.
    ///
    /// A new record is written before its value is projected into the legacy
    /// aggregate, so an aborted call never leaves an aggregate entry without
    /// a record. Reinforcement never projects and never notifies.
    pub async fn add_or_reinforce(
        &self,
        user_id: &str,
        kind: MemoryKind,
        value: &str,
        source: MemorySource,
        notify: bool,
    ) -> Result<Observed, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(
                "Memory value must not be empty".to_string(),
            ));
        }

        if let Some(mut existing) = self.find_existing(user_id, &kind, value).await? {
            let now = Utc::now();
            existing.reinforce(now);
            self.store
                .update(
                    user_id,
                    &existing.id,
                    reinforcement_fields(existing.confidence, now),
                )
                .await?;

            tracing::debug!(
                "Reinforced memory {} ({} '{}') to {:.2}",
                existing.id,
                existing.kind,
                existing.value,
                existing.confidence
            );
            return Ok(Observed::Reinforced(existing));
        }

        let record = MemoryRecord::new(kind, value.to_string(), source);
        self.store
            .set(user_id, &record.id, record.to_document())
            .await?;

        tracing::info!(
            "Created memory {} for {}: {} '{}' ({})",
            record.id,
            user_id,
            record.kind,
            record.value,
            record.source
        );

        self.projector
            .project(user_id, &record.kind, &record.value, ProjectionOp::Add)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    "Memory {} stored but legacy projection failed: {}",
                    record.id,
                    e
                )
            })?;

        if notify {
            self.events.emit(user_id, record.clone());
        }

        Ok(Observed::Created(record))
    }

    /// Delete a memory and retract its value from the legacy aggregate.
    ///
    /// Deleting a memory that is already gone succeeds.
    pub async fn remove(&self, user_id: &str, memory_id: &str) -> Result<(), DomainError> {
        let Some(doc) = self.store.get(user_id, memory_id).await? else {
            tracing::debug!("Memory {} already absent for {}", memory_id, user_id);
            return Ok(());
        };

        self.store.delete(user_id, memory_id).await?;
        tracing::info!("Deleted memory {} for {}", memory_id, user_id);

        match MemoryRecord::from_document(&doc) {
            Some(record) => {
                self.projector
                    .project(user_id, &record.kind, &record.value, ProjectionOp::Remove)
                    .await
            }
            None => {
                tracing::warn!(
                    "Deleted malformed memory document {}; nothing to retract",
                    memory_id
                );
                Ok(())
            }
        }
    }

    /// Delete every memory of a user in one batch and empty the aggregates.
    ///
    /// Returns the number of deleted documents.
    pub async fn wipe_all(&self, user_id: &str) -> Result<usize, DomainError> {
        let ids: Vec<String> = self
            .store
            .query(user_id, &[])
            .await?
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        if !ids.is_empty() {
            self.store.batch_delete(user_id, &ids).await?;
        }
        self.projector.reset(user_id).await?;

        tracing::info!("Wiped {} memories for {}", ids.len(), user_id);
        Ok(ids.len())
    }

    /// All memories, most recently observed first
    pub async fn get_all(&self, user_id: &str) -> Result<Vec<MemoryRecord>, DomainError> {
        let docs = self.store.query(user_id, &[]).await?;
        Ok(decode_all(docs))
    }

    /// Memories of one kind, most recently observed first
    pub async fn get_by_kind(
        &self,
        user_id: &str,
        kind: &MemoryKind,
    ) -> Result<Vec<MemoryRecord>, DomainError> {
        let filters = [FieldFilter::eq(keys::TYPE, kind.to_string())];
        let docs = self.store.query(user_id, &filters).await?;
        Ok(decode_all(docs))
    }

    /// Current legacy aggregate lists
    pub async fn legacy_profile(&self, user_id: &str) -> Result<LegacyProfile, DomainError> {
        self.projector.read(user_id).await
    }

    /// Rebuild the legacy aggregates from the record collection
    pub async fn reconcile_legacy_aggregates(
        &self,
        user_id: &str,
    ) -> Result<LegacyProfile, DomainError> {
        let records = self.get_all(user_id).await?;
        let profile = self.projector.rebuild(user_id, &records).await?;
        tracing::info!(
            "Reconciled legacy aggregates for {} from {} memories",
            user_id,
            records.len()
        );
        Ok(profile)
    }

    // ============================================
    // Typed recorders
    // ============================================

    pub async fn record_completed_exercise(
        &self,
        user_id: &str,
        exercise: &str,
    ) -> Result<Observed, DomainError> {
        self.add_or_reinforce(
            user_id,
            MemoryKind::PreferredExercise,
            exercise,
            MemorySource::CompletedExercise,
            true,
        )
        .await
    }

    pub async fn record_skipped_exercise(
        &self,
        user_id: &str,
        exercise: &str,
    ) -> Result<Observed, DomainError> {
        self.add_or_reinforce(
            user_id,
            MemoryKind::AvoidedExercise,
            exercise,
            MemorySource::SkippedExercise,
            true,
        )
        .await
    }

    pub async fn record_completed_meal(
        &self,
        user_id: &str,
        meal: &str,
    ) -> Result<Observed, DomainError> {
        self.add_or_reinforce(
            user_id,
            MemoryKind::PreferredMeal,
            meal,
            MemorySource::CompletedMeal,
            true,
        )
        .await
    }

    /// One observation per ingredient; each succeeds or fails on its own
    pub async fn record_skipped_ingredients(
        &self,
        user_id: &str,
        ingredients: &[String],
    ) -> Vec<Result<Observed, DomainError>> {
        let mut results = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            let result = self
                .add_or_reinforce(
                    user_id,
                    MemoryKind::AvoidedIngredient,
                    ingredient,
                    MemorySource::SkippedMeal,
                    true,
                )
                .await;
            if let Err(e) = &result {
                tracing::warn!("Failed to record skipped ingredient '{}': {}", ingredient, e);
            }
            results.push(result);
        }
        results
    }

    pub async fn record_conversation_preference(
        &self,
        user_id: &str,
        kind: MemoryKind,
        value: &str,
    ) -> Result<Observed, DomainError> {
        self.add_or_reinforce(user_id, kind, value, MemorySource::Conversation, true)
            .await
    }

    /// Background-inferred; never announced to the user
    pub async fn record_activity_pattern(
        &self,
        user_id: &str,
        pattern: &str,
    ) -> Result<Observed, DomainError> {
        self.add_or_reinforce(
            user_id,
            MemoryKind::ActivityPattern,
            pattern,
            MemorySource::HealthKitPattern,
            false,
        )
        .await
    }

    async fn find_existing(
        &self,
        user_id: &str,
        kind: &MemoryKind,
        value: &str,
    ) -> Result<Option<MemoryRecord>, DomainError> {
        let filters = [
            FieldFilter::eq(keys::TYPE, kind.to_string()),
            FieldFilter::eq(keys::VALUE, Value::String(value.to_string())),
        ];
        let docs = self.store.query(user_id, &filters).await?;
        Ok(decode_all(docs).into_iter().next())
    }
}

/// Decode documents, dropping the ones that do not parse
fn decode_all(docs: Vec<StoredDocument>) -> Vec<MemoryRecord> {
    docs.into_iter()
        .filter_map(|doc| {
            let record = MemoryRecord::from_document(&doc.data);
            if record.is_none() {
                tracing::warn!("Skipping malformed memory document {}", doc.id);
            }
            record
        })
        .collect()
}
