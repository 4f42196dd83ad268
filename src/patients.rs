//! Patient intake records.
//!
//! Intakes are resolved against the catalog first and only then appended to
//! the `pacientes` collection. Records are never updated or deleted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::SymptomCatalog;
use crate::error::Result;
use crate::storage::{to_fields, Document, DocumentStore};

pub const PATIENTS_COLLECTION: &str = "pacientes";

/// Incoming intake as posted by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeRequest {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "sintomaId")]
    pub symptom_id: i64,
    #[serde(rename = "nivelDolor")]
    pub pain_level: i64,
}

/// Persisted confirmation bundled with the resolved recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeReceipt {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "sintoma")]
    pub symptom_name: String,
    #[serde(rename = "recomendaciones")]
    pub recommendations: Vec<String>,
    #[serde(rename = "alerta")]
    pub alert: bool,
}

/// Fields stored for each intake; `fecha` comes from the store's creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredIntake {
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "sintomaId")]
    symptom_id: i64,
    #[serde(rename = "nivelDolor")]
    pain_level: i64,
    #[serde(rename = "sintomaNombre")]
    symptom_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "sintomaId")]
    pub symptom_id: i64,
    #[serde(rename = "nivelDolor")]
    pub pain_level: i64,
    #[serde(rename = "fecha")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "sintomaNombre")]
    pub symptom_name: String,
}

impl PatientRecord {
    fn from_document(document: Document) -> std::result::Result<Self, serde_json::Error> {
        let stored: StoredIntake = serde_json::from_value(serde_json::Value::Object(document.fields))?;
        Ok(PatientRecord {
            id: document.id,
            name: stored.name,
            symptom_id: stored.symptom_id,
            pain_level: stored.pain_level,
            created_at: document.create_time,
            symptom_name: stored.symptom_name,
        })
    }
}

pub struct PatientRegistry {
    catalog: Arc<SymptomCatalog>,
    store: Arc<dyn DocumentStore>,
}

impl PatientRegistry {
    pub fn new(catalog: Arc<SymptomCatalog>, store: Arc<dyn DocumentStore>) -> Self {
        PatientRegistry { catalog, store }
    }

    /// Every stored intake, in the store's default order.
    pub async fn list_all(&self) -> Result<Vec<PatientRecord>> {
        let documents = self.store.get(PATIENTS_COLLECTION).await?;
        let mut records = Vec::with_capacity(documents.len());

        for document in documents {
            let id = document.id.clone();
            match PatientRecord::from_document(document) {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!(%id, error = %err, "skipping malformed patient document"),
            }
        }

        Ok(records)
    }

    /// Resolve the intake, then persist it.
    ///
    /// Resolution failures return before the store is touched.
    pub async fn create(&self, request: IntakeRequest) -> Result<IntakeReceipt> {
        let resolution = self.catalog.resolve(request.symptom_id, request.pain_level)?;

        let stored = StoredIntake {
            name: request.name,
            symptom_id: request.symptom_id,
            pain_level: request.pain_level,
            symptom_name: resolution.symptom.name.clone(),
        };
        let fields = to_fields(&stored)?;

        let document = self.store.add(PATIENTS_COLLECTION, fields).await.map_err(|err| {
            tracing::error!(error = %err, "failed to persist patient intake");
            err
        })?;

        tracing::info!(id = %document.id, symptom = stored.symptom_id, alert = resolution.alert(), "patient intake stored");

        Ok(IntakeReceipt {
            id: document.id,
            name: stored.name,
            symptom_name: stored.symptom_name,
            recommendations: resolution.recommendations().to_vec(),
            alert: resolution.alert(),
        })
    }
}
