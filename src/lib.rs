//! ROMI: symptom catalog and patient intake service
//!
//! Serves a fixed catalog of symptoms with pain-level recommendation tiers,
//! records patient intakes into a document store and can seed that store
//! with the catalog.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod patients;
pub mod seed;
pub mod storage;

pub use catalog::{Resolution, Symptom, SymptomCatalog};
pub use error::{Result, RomiError};
pub use patients::{IntakeReceipt, IntakeRequest, PatientRecord, PatientRegistry};
pub use seed::{CatalogSeeder, SeedResult};
pub use storage::{DocumentStore, FileStore, MemoryStore};
