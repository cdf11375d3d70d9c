//! In-memory document store
//!
//! Mirrors the server behavior the loader relies on: generated keys, `_id` and
//! `_rev` defaults, unique keys per collection and `_from`/`_to` checks on edge
//! collections. Used by `--dry-run` and by tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::store::{CollectionKind, Document, DocumentStore, EdgeDefinition, StoreError};

#[derive(Debug, Default)]
struct DatabaseState {
    collections: BTreeMap<String, CollectionState>,
    graphs: BTreeMap<String, Vec<EdgeDefinition>>,
}

#[derive(Debug)]
struct CollectionState {
    kind: CollectionKind,
    documents: BTreeMap<String, Document>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    databases: Mutex<BTreeMap<String, DatabaseState>>,
    next_key: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, DatabaseState>>, StoreError> {
        self.databases
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Next counter value not already used as a key in `taken`
    fn generate_key(&self, taken: &BTreeMap<String, Document>) -> String {
        loop {
            let key = (self.next_key.fetch_add(1, Ordering::Relaxed) + 1).to_string();
            if !taken.contains_key(&key) {
                return key;
            }
        }
    }

    /// Kind of a collection, if it exists
    pub fn collection_kind(&self, database: &str, collection: &str) -> Option<CollectionKind> {
        let databases = self.lock().ok()?;
        databases
            .get(database)?
            .collections
            .get(collection)
            .map(|c| c.kind)
    }

    /// Number of documents stored in a collection
    pub fn document_count(&self, database: &str, collection: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|dbs| {
                dbs.get(database)?
                    .collections
                    .get(collection)
                    .map(|c| c.documents.len())
            })
            .unwrap_or(0)
    }

    /// Edge definitions of a named graph
    pub fn graph(&self, database: &str, name: &str) -> Option<Vec<EdgeDefinition>> {
        let databases = self.lock().ok()?;
        databases.get(database)?.graphs.get(name).cloned()
    }
}

fn missing_database(name: &str) -> StoreError {
    StoreError::Unavailable(format!("database not found: {}", name))
}

fn missing_collection(name: &str) -> StoreError {
    StoreError::Unavailable(format!("collection or view not found: {}", name))
}

fn is_non_empty_string(doc: &Document, field: &str) -> bool {
    matches!(doc.get(field), Some(Value::String(s)) if !s.is_empty())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn create_database(&self, name: &str) -> Result<(), StoreError> {
        let mut databases = self.lock()?;
        if databases.contains_key(name) {
            return Err(StoreError::Unavailable(format!("duplicate database name: {}", name)));
        }
        databases.insert(name.to_string(), DatabaseState::default());
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<(), StoreError> {
        self.lock()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing_database(name))
    }

    async fn collection_exists(&self, database: &str, name: &str) -> Result<bool, StoreError> {
        let databases = self.lock()?;
        let db = databases.get(database).ok_or_else(|| missing_database(database))?;
        Ok(db.collections.contains_key(name))
    }

    async fn create_collection(
        &self,
        database: &str,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(), StoreError> {
        let mut databases = self.lock()?;
        let db = databases
            .get_mut(database)
            .ok_or_else(|| missing_database(database))?;
        if db.collections.contains_key(name) {
            return Err(StoreError::Unavailable(format!("duplicate collection name: {}", name)));
        }
        db.collections.insert(
            name.to_string(),
            CollectionState {
                kind,
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn insert_documents(
        &self,
        database: &str,
        collection: &str,
        documents: &[Document],
    ) -> Result<Vec<String>, StoreError> {
        let mut databases = self.lock()?;
        let db = databases
            .get_mut(database)
            .ok_or_else(|| missing_database(database))?;
        let state = db
            .collections
            .get_mut(collection)
            .ok_or_else(|| missing_collection(collection))?;

        let mut keys = Vec::with_capacity(documents.len());
        let mut failures = Vec::new();

        for doc in documents {
            if state.kind == CollectionKind::Edge
                && !(is_non_empty_string(doc, "_from") && is_non_empty_string(doc, "_to"))
            {
                failures.push("invalid edge attribute".to_string());
                continue;
            }

            let key = match doc.get("_key") {
                Some(Value::String(k)) => k.clone(),
                Some(_) => {
                    failures.push("illegal document key".to_string());
                    continue;
                }
                None => self.generate_key(&state.documents),
            };

            if state.documents.contains_key(&key) {
                failures.push(format!("unique constraint violated: {}", key));
                continue;
            }

            let mut stored = doc.clone();
            stored.insert("_key".to_string(), Value::String(key.clone()));
            stored.insert(
                "_id".to_string(),
                Value::String(format!("{}/{}", collection, key)),
            );
            stored.insert("_rev".to_string(), Value::String(format!("_rev{}", key)));
            state.documents.insert(key.clone(), stored);
            keys.push(key);
        }

        match failures.first() {
            Some(first) => Err(StoreError::Rejected {
                count: failures.len(),
                first: first.clone(),
            }),
            None => Ok(keys),
        }
    }

    async fn documents_by_keys(
        &self,
        database: &str,
        collection: &str,
        keys: &[String],
    ) -> Result<Vec<Document>, StoreError> {
        let databases = self.lock()?;
        let state = databases
            .get(database)
            .ok_or_else(|| missing_database(database))?
            .collections
            .get(collection)
            .ok_or_else(|| missing_collection(collection))?;
        Ok(keys
            .iter()
            .filter_map(|k| state.documents.get(k).cloned())
            .collect())
    }

    async fn graph_exists(&self, database: &str, name: &str) -> Result<bool, StoreError> {
        let databases = self.lock()?;
        let db = databases.get(database).ok_or_else(|| missing_database(database))?;
        Ok(db.graphs.contains_key(name))
    }

    async fn create_graph(
        &self,
        database: &str,
        name: &str,
        edge_definitions: &[EdgeDefinition],
    ) -> Result<(), StoreError> {
        let mut databases = self.lock()?;
        let db = databases
            .get_mut(database)
            .ok_or_else(|| missing_database(database))?;
        if db.graphs.contains_key(name) {
            return Err(StoreError::Unavailable(format!("graph already exists: {}", name)));
        }
        for def in edge_definitions {
            match db.collections.get(&def.collection) {
                Some(c) if c.kind == CollectionKind::Edge => {}
                _ => {
                    return Err(StoreError::Unavailable(format!(
                        "edge collection not found: {}",
                        def.collection
                    )));
                }
            }
        }
        db.graphs.insert(name.to_string(), edge_definitions.to_vec());
        Ok(())
    }
}
