//! In-memory implementation of RecordStore
//!
//! Used for local development and tests. Every operation runs under a
//! single lock scope, which gives the same per-document and batch
//! atomicity the remote store provides.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use fitmem::{
    apply_field_updates, decode_timestamp, keys, DomainError, Document, FieldFilter,
    FieldUpdates, RecordStore, StoredDocument,
};

#[derive(Debug, Default)]
struct UserDocuments {
    memories: HashMap<String, Document>,
    profile: Option<Document>,
}

/// Process-local RecordStore
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    users: RwLock<HashMap<String, UserDocuments>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query(
        &self,
        user_id: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredDocument>, DomainError> {
        let users = self.users.read().await;
        let Some(user) = users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut docs: Vec<StoredDocument> = user
            .memories
            .iter()
            .filter(|(_, doc)| filters.iter().all(|f| f.matches(doc)))
            .map(|(id, doc)| StoredDocument {
                id: id.clone(),
                data: doc.clone(),
            })
            .collect();

        // Newest first; documents without a readable timestamp go last
        docs.sort_by_cached_key(|doc| {
            std::cmp::Reverse(doc.data.get(keys::CREATED_AT).and_then(decode_timestamp))
        });
        Ok(docs)
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<Document>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|user| user.memories.get(id))
            .cloned())
    }

    async fn set(&self, user_id: &str, id: &str, document: Document) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .memories
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let doc = users
            .get_mut(user_id)
            .and_then(|user| user.memories.get_mut(id))
            .ok_or_else(|| DomainError::not_found("Memory", id))?;
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(user_id) {
            user.memories.remove(id);
        }
        Ok(())
    }

    async fn batch_delete(&self, user_id: &str, ids: &[String]) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(user_id) {
            for id in ids {
                user.memories.remove(id);
            }
        }
        Ok(())
    }

    async fn merge_fields(
        &self,
        user_id: &str,
        updates: FieldUpdates,
    ) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let profile = users
            .entry(user_id.to_string())
            .or_default()
            .profile
            .get_or_insert_with(Document::new);
        apply_field_updates(profile, &updates);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Document>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|user| user.profile.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn doc_at(value: &str, minutes_ago: i64) -> Document {
        let mut doc = Document::new();
        doc.insert("value".into(), json!(value));
        doc.insert(
            "created_at".into(),
            json!((Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339()),
        );
        doc
    }

    #[tokio::test]
    async fn test_query_orders_newest_first() {
        let store = InMemoryRecordStore::new();
        store.set("u1", "old", doc_at("old", 30)).await.unwrap();
        store.set("u1", "new", doc_at("new", 1)).await.unwrap();
        store.set("u1", "mid", doc_at("mid", 10)).await.unwrap();
        let mut undated = Document::new();
        undated.insert("value".into(), json!("undated"));
        store.set("u1", "undated", undated).await.unwrap();

        let ids: Vec<String> = store
            .query("u1", &[])
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old", "undated"]);
    }

    #[tokio::test]
    async fn test_query_applies_filters_and_user_scope() {
        let store = InMemoryRecordStore::new();
        store.set("u1", "a", doc_at("Squats", 1)).await.unwrap();
        store.set("u1", "b", doc_at("Lunges", 2)).await.unwrap();
        store.set("u2", "c", doc_at("Squats", 3)).await.unwrap();

        let found = store
            .query("u1", &[FieldFilter::eq("value", "Squats")])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.update("u1", "nope", Document::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_overwrites_only_given_fields() {
        let store = InMemoryRecordStore::new();
        store.set("u1", "a", doc_at("Squats", 5)).await.unwrap();
        let mut fields = Document::new();
        fields.insert("confidence".into(), json!(0.6));
        store.update("u1", "a", fields).await.unwrap();

        let doc = store.get("u1", "a").await.unwrap().unwrap();
        assert_eq!(doc["value"], json!("Squats"));
        assert_eq!(doc["confidence"], json!(0.6));
    }

    #[tokio::test]
    async fn test_delete_and_batch_delete_tolerate_missing() {
        let store = InMemoryRecordStore::new();
        store.delete("u1", "ghost").await.unwrap();
        store.set("u1", "a", doc_at("a", 1)).await.unwrap();
        store
            .batch_delete("u1", &["a".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert!(store.query("u1", &[]).await.unwrap().is_empty());
    }
}
