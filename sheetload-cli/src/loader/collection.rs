//! Load one worksheet into its collection

use std::collections::BTreeMap;

use log::{debug, info};

use super::database::Database;
use super::error::LoadError;
use super::worksheet::{CollectionSpec, Worksheet};
use crate::api::Document;

/// Documents of one collection keyed by `_key`, as read back from the store
pub type KeyedDocuments = BTreeMap<String, Document>;

/// Result of loading one worksheet
#[derive(Debug, Clone)]
pub struct SheetLoad {
    pub spec: CollectionSpec,
    pub documents: KeyedDocuments,
}

/// Classify, create the collection if needed, insert all rows in one request
/// and read the inserted documents back by key.
///
/// Nothing is written when classification fails.
pub async fn load_worksheet(db: &Database, worksheet: &Worksheet) -> Result<SheetLoad, LoadError> {
    let spec = worksheet.classify()?;
    let write_error = |source| LoadError::StoreWrite {
        collection: spec.name.clone(),
        source,
    };

    db.ensure_collection(&spec.name, spec.kind)
        .await
        .map_err(write_error)?;

    let documents = worksheet.documents();
    if documents.is_empty() {
        info!("Worksheet '{}' has no data rows", spec.name);
        return Ok(SheetLoad {
            spec,
            documents: KeyedDocuments::new(),
        });
    }

    debug!(
        "Inserting {} document(s) into {} collection '{}'",
        documents.len(),
        spec.kind,
        spec.name
    );
    let keys = db
        .insert_documents(&spec.name, &documents)
        .await
        .map_err(write_error)?;

    let inserted = db
        .documents_by_keys(&spec.name, &keys)
        .await
        .map_err(|source| LoadError::StoreRead {
            collection: spec.name.clone(),
            source,
        })?;

    let documents: KeyedDocuments = inserted
        .into_iter()
        .filter_map(|doc| {
            let key = doc.get("_key")?.as_str()?.to_string();
            Some((key, doc))
        })
        .collect();

    info!(
        "Loaded {} document(s) into '{}'",
        documents.len(),
        spec.name
    );
    Ok(SheetLoad { spec, documents })
}
