//! PostgreSQL implementation of RecordStore
//!
//! Documents live in JSONB columns. `created_at` is mirrored into a typed
//! column so recency ordering does not depend on string formats.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use fitmem::{
    apply_field_updates, decode_timestamp, keys, DomainError, Document, FieldFilter,
    FieldUpdates, RecordStore, StoredDocument,
};

/// PostgreSQL implementation of RecordStore
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Document>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            data: row.data.0,
        }
    }
}

/// Typed mirror of the document's `created_at`
fn created_at_of(doc: &Document) -> Option<DateTime<Utc>> {
    doc.get(keys::CREATED_AT).and_then(decode_timestamp)
}

/// Equality filters as a JSONB containment pattern
fn containment_pattern(filters: &[FieldFilter]) -> Value {
    Value::Object(
        filters
            .iter()
            .map(|f| (f.field.clone(), f.value.clone()))
            .collect(),
    )
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn query(
        &self,
        user_id: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredDocument>, DomainError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data FROM memory_documents
            WHERE user_id = $1 AND data @> $2
            ORDER BY created_at DESC NULLS LAST
            "#,
        )
        .bind(user_id)
        .bind(Json(containment_pattern(filters)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Document>, DomainError> {
        let data = sqlx::query_scalar::<_, Json<Document>>(
            "SELECT data FROM memory_documents WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(data.map(|json| json.0))
    }

    async fn set(&self, user_id: &str, id: &str, document: Document) -> Result<(), DomainError> {
        let created_at = created_at_of(&document);
        sqlx::query(
            r#"
            INSERT INTO memory_documents (user_id, id, data, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, id)
            DO UPDATE SET data = EXCLUDED.data, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(Json(&document))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), DomainError> {
        let created_at = created_at_of(&fields);
        let result = sqlx::query(
            r#"
            UPDATE memory_documents
            SET data = data || $3, created_at = COALESCE($4, created_at)
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(Json(&fields))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Memory", id));
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM memory_documents WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn batch_delete(&self, user_id: &str, ids: &[String]) -> Result<(), DomainError> {
        // Single statement, so all or nothing
        sqlx::query("DELETE FROM memory_documents WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn merge_fields(
        &self,
        user_id: &str,
        updates: FieldUpdates,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        sqlx::query("INSERT INTO user_documents (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let Json(mut profile) = sqlx::query_scalar::<_, Json<Document>>(
            "SELECT data FROM user_documents WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        apply_field_updates(&mut profile, &updates);

        sqlx::query("UPDATE user_documents SET data = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(Json(&profile))
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Document>, DomainError> {
        let data = sqlx::query_scalar::<_, Json<Document>>(
            "SELECT data FROM user_documents WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(data.map(|json| json.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitmem::{MemoryKind, MemoryRecord, MemorySource};
    use serde_json::json;

    #[test]
    fn test_created_at_mirrors_document_timestamp() {
        let record = MemoryRecord::new(
            MemoryKind::PreferredExercise,
            "Squats".into(),
            MemorySource::CompletedExercise,
        );
        assert_eq!(
            created_at_of(&record.to_document()),
            Some(record.created_at)
        );
        assert_eq!(created_at_of(&Document::new()), None);
    }

    #[test]
    fn test_containment_pattern_combines_filters() {
        let pattern = containment_pattern(&[
            FieldFilter::eq("type", "preferredMeal"),
            FieldFilter::eq("value", "Oatmeal"),
        ]);
        assert_eq!(pattern, json!({"type": "preferredMeal", "value": "Oatmeal"}));
        assert_eq!(containment_pattern(&[]), json!({}));
    }
}
