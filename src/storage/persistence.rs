use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{apply_set, new_document_id, Collection, Document, DocumentStore, Fields, StorageError, WriteBatch};

const COLLECTION_EXT: &str = "json";

/// Persistent store keeping one JSON snapshot file per collection.
///
/// Every mutation rewrites the affected collection files; the in-memory view
/// is only updated once the files are durably in place.
#[derive(Debug)]
pub struct FileStore {
    base_path: PathBuf,
    collections: Mutex<HashMap<String, Collection>>,
}

impl FileStore {
    /// Open (or create) a store rooted at `base_path`, loading existing collections.
    pub async fn open(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await?;

        let mut collections = HashMap::new();
        for name in list_collections(&base_path).await? {
            let collection = load_collection(&base_path, &name).await?;
            tracing::debug!(collection = %name, documents = collection.len(), "loaded collection");
            collections.insert(name, collection);
        }

        Ok(FileStore {
            base_path,
            collections: Mutex::new(collections),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write a collection snapshot via temp file + rename.
    async fn save_collection(&self, name: &str, collection: &Collection) -> Result<(), StorageError> {
        let temp_path = temp_path(&self.base_path, name);
        if let Err(err) = write_snapshot(&temp_path, collection).await {
            discard_temp_files(std::slice::from_ref(&temp_path)).await;
            return Err(err);
        }
        fs::rename(&temp_path, collection_path(&self.base_path, name)).await?;
        Ok(())
    }

    /// Replace several collection files together.
    ///
    /// Every snapshot is written and synced before the first rename, so a
    /// failed write leaves all collection files as they were.
    async fn save_collections(&self, staged: &BTreeMap<String, Collection>) -> Result<(), StorageError> {
        let mut temp_paths = Vec::with_capacity(staged.len());
        for (name, collection) in staged {
            let temp_path = temp_path(&self.base_path, name);
            temp_paths.push(temp_path.clone());
            if let Err(err) = write_snapshot(&temp_path, collection).await {
                discard_temp_files(&temp_paths).await;
                return Err(err);
            }
        }

        for (name, temp_path) in staged.keys().zip(&temp_paths) {
            fs::rename(temp_path, collection_path(&self.base_path, name)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Append one document.
    ///
    /// The collection file is a single snapshot, so each add rewrites every
    /// document already in it. Cost grows linearly with the collection.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StorageError> {
        validate_name(collection)?;
        let document = Document {
            id: new_document_id(),
            create_time: Utc::now(),
            fields,
        };

        let mut collections = self.collections.lock().await;
        let mut updated = collections.get(collection).cloned().unwrap_or_default();
        updated.insert(document.id.clone(), document.clone());

        self.save_collection(collection, &updated).await?;
        collections.insert(collection.to_string(), updated);
        Ok(document)
    }

    async fn batch_write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        for op in batch.ops() {
            validate_name(&op.collection)?;
        }

        let now = Utc::now();
        let mut collections = self.collections.lock().await;

        // Stage every touched collection before writing anything.
        let mut staged: BTreeMap<String, Collection> = BTreeMap::new();
        for op in batch.into_ops() {
            let docs = staged
                .entry(op.collection.clone())
                .or_insert_with(|| collections.get(&op.collection).cloned().unwrap_or_default());
            apply_set(docs, op.id, op.fields, now);
        }

        self.save_collections(&staged).await?;
        collections.extend(staged);
        Ok(())
    }
}

fn collection_path(base_path: &Path, name: &str) -> PathBuf {
    base_path.join(format!("{}.{}", name, COLLECTION_EXT))
}

fn temp_path(base_path: &Path, name: &str) -> PathBuf {
    base_path.join(format!("{}.tmp", name))
}

async fn write_snapshot(path: &Path, collection: &Collection) -> Result<(), StorageError> {
    let documents: Vec<&Document> = collection.values().collect();
    let serialized = serde_json::to_vec_pretty(&documents)?;

    let mut file = File::create(path).await?;
    file.write_all(&serialized).await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard_temp_files(paths: &[PathBuf]) {
    for path in paths {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "could not remove temp file"),
        }
    }
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidDocument(format!("illegal collection name '{}'", name)))
    }
}

async fn list_collections(base_path: &Path) -> Result<Vec<String>, StorageError> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(base_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == COLLECTION_EXT) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

async fn load_collection(base_path: &Path, name: &str) -> Result<Collection, StorageError> {
    let buffer = fs::read(collection_path(base_path, name)).await?;
    let documents: Vec<Document> = serde_json::from_slice(&buffer).map_err(|e| StorageError::Corrupt {
        collection: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(documents.into_iter().map(|doc| (doc.id.clone(), doc)).collect())
}
