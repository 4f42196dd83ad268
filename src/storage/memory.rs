use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{apply_set, new_document_id, Collection, Document, DocumentStore, Fields, StorageError, WriteBatch};

/// Process-local store; contents are lost on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StorageError> {
        let document = Document {
            id: new_document_id(),
            create_time: Utc::now(),
            fields,
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn batch_write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut collections = self.collections.write().await;
        for op in batch.into_ops() {
            let docs = collections.entry(op.collection).or_default();
            apply_set(docs, op.id, op.fields, now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.get("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_assigns_id_and_time() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let doc = store.add("pacientes", fields(json!({"nombre": "Ana"}))).await.unwrap();
        assert!(!doc.id.is_empty());
        assert!(doc.create_time >= before);

        let listed = store.get("pacientes").await.unwrap();
        assert_eq!(listed, vec![doc]);
    }

    #[tokio::test]
    async fn batch_overwrites_by_key() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.set("sintomas", "1", fields(json!({"name": "a"})));
        store.batch_write(batch.clone()).await.unwrap();
        store.batch_write(batch).await.unwrap();

        let docs = store.get("sintomas").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "1");
    }
}
