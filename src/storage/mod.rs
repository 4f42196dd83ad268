//! Document storage
//!
//! Handles the persistence the service relies on:
//! - Named collections of JSON documents
//! - Store-assigned ids and creation times
//! - All-or-nothing batch writes

mod memory;
mod persistence;

pub use memory::MemoryStore;
pub use persistence::FileStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Documents of one collection, keyed by id.
pub(crate) type Collection = BTreeMap<String, Document>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub create_time: DateTime<Utc>,
    pub fields: Fields,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("corrupt collection {collection}: {reason}")]
    Corrupt { collection: String, reason: String },
}

/// A single `set` inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetOp {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
}

/// Writes committed together by [`DocumentStore::batch_write`].
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<SetOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch::default()
    }

    /// Create or overwrite document `id` in `collection`.
    pub fn set(&mut self, collection: &str, id: impl Into<String>, fields: Fields) -> &mut Self {
        self.ops.push(SetOp {
            collection: collection.to_string(),
            id: id.into(),
            fields,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[SetOp] {
        &self.ops
    }

    pub(crate) fn into_ops(self) -> Vec<SetOp> {
        self.ops
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// All documents of `collection`, ordered by id. Unknown collections are empty.
    async fn get(&self, collection: &str) -> Result<Vec<Document>, StorageError>;
    /// Insert a new document; the store assigns its id and creation time.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StorageError>;
    /// Apply every operation of `batch`, or none of them.
    async fn batch_write(&self, batch: WriteBatch) -> Result<(), StorageError>;
}

/// Serialize a value into document fields; only JSON objects qualify.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StorageError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StorageError::InvalidDocument(format!("expected a JSON object, got {}", other))),
    }
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Apply a `set` to a collection, keeping the creation time of an existing document.
pub(crate) fn apply_set(collection: &mut Collection, id: String, fields: Fields, now: DateTime<Utc>) {
    match collection.get_mut(&id) {
        Some(existing) => existing.fields = fields,
        None => {
            collection.insert(id.clone(), Document { id, create_time: now, fields });
        }
    }
}
