//! Database provisioning and the database-scoped handle

use std::sync::Arc;

use log::{debug, info, warn};

use super::error::LoadError;
use crate::api::{CollectionKind, Document, DocumentStore, EdgeDefinition, StoreError};

/// Handle to one database, shared by all concurrent worksheet loads
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
    name: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}

/// Make sure `name` exists, dropping it first when `clean` is set
pub async fn ensure_database(
    store: Arc<dyn DocumentStore>,
    name: &str,
    clean: bool,
) -> Result<Database, LoadError> {
    let provisioning = |source: StoreError| LoadError::Provisioning {
        database: name.to_string(),
        source,
    };

    let existing = store.list_databases().await.map_err(provisioning)?;
    let mut exists = existing.iter().any(|db| db == name);

    if clean && exists {
        warn!("Dropping existing database '{}'", name);
        store.drop_database(name).await.map_err(provisioning)?;
        exists = false;
    }

    if exists {
        debug!("Reusing database '{}'", name);
    } else {
        info!("Creating database '{}'", name);
        store.create_database(name).await.map_err(provisioning)?;
    }

    Ok(Database {
        store,
        name: name.to_string(),
    })
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the collection unless it already exists. Existing collections are
    /// used as they are, whatever their type.
    pub async fn ensure_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
        if self.store.collection_exists(&self.name, name).await? {
            debug!("Collection '{}' already exists", name);
            return Ok(());
        }
        self.store.create_collection(&self.name, name, kind).await
    }

    pub async fn insert_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<Vec<String>, StoreError> {
        self.store
            .insert_documents(&self.name, collection, documents)
            .await
    }

    pub async fn documents_by_keys(
        &self,
        collection: &str,
        keys: &[String],
    ) -> Result<Vec<Document>, StoreError> {
        self.store
            .documents_by_keys(&self.name, collection, keys)
            .await
    }

    /// Create the graph unless it already exists. Returns whether it was created.
    pub async fn ensure_graph(
        &self,
        name: &str,
        edge_definitions: &[EdgeDefinition],
    ) -> Result<bool, StoreError> {
        if self.store.graph_exists(&self.name, name).await? {
            return Ok(false);
        }
        self.store
            .create_graph(&self.name, name, edge_definitions)
            .await?;
        Ok(true)
    }
}
