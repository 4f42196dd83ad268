//! One-shot copy of the built-in catalog into the document store.

use serde::Serialize;
use std::sync::Arc;

use crate::catalog::SymptomCatalog;
use crate::error::Result;
use crate::storage::{to_fields, DocumentStore, WriteBatch};

pub const SYMPTOMS_COLLECTION: &str = "sintomas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub migrated: bool,
    pub written: usize,
}

pub struct CatalogSeeder {
    catalog: Arc<SymptomCatalog>,
    store: Arc<dyn DocumentStore>,
}

impl CatalogSeeder {
    pub fn new(catalog: Arc<SymptomCatalog>, store: Arc<dyn DocumentStore>) -> Self {
        CatalogSeeder { catalog, store }
    }

    /// Write every symptom keyed by its id, unless the collection already has documents.
    ///
    /// The emptiness check and the batch are not atomic; concurrent seeds may
    /// both write, which only overwrites identical documents.
    pub async fn seed_if_empty(&self) -> Result<SeedResult> {
        let existing = self.store.get(SYMPTOMS_COLLECTION).await?;
        if !existing.is_empty() {
            tracing::info!(existing = existing.len(), "symptom collection already populated, skipping seed");
            return Ok(SeedResult { migrated: false, written: 0 });
        }

        let mut batch = WriteBatch::new();
        for symptom in self.catalog.all() {
            batch.set(SYMPTOMS_COLLECTION, symptom.id.to_string(), to_fields(symptom)?);
        }
        let written = batch.len();

        self.store.batch_write(batch).await?;
        tracing::info!(written, "symptom catalog seeded");
        Ok(SeedResult { migrated: true, written })
    }
}
