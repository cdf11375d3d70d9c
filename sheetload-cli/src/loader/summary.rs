//! Aggregate result of a workbook load

use std::collections::BTreeMap;

use log::warn;

use super::collection::{KeyedDocuments, SheetLoad};
use super::database::Database;
use super::error::LoadError;
use crate::api::EdgeDefinition;

/// A worksheet that failed while others carried on
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: LoadError,
}

#[derive(Debug)]
pub struct LoadSummary {
    /// Handle to the database that was written, ready for further queries
    pub db: Database,
    /// Collection name to documents keyed by `_key`
    pub collections: BTreeMap<String, KeyedDocuments>,
    /// Edge definitions of the edge worksheets that loaded, in workbook order
    pub edge_definitions: Vec<EdgeDefinition>,
    /// Worksheets that failed, in workbook order
    pub failures: Vec<SheetFailure>,
    /// Number of worksheets attempted (hidden sheets excluded)
    pub sheet_count: usize,
    /// Graph created by this run, if any
    pub graph_created: Option<String>,
}

impl LoadSummary {
    /// Fold per-worksheet outcomes, given in workbook order. When two sheets
    /// name the same collection the later one replaces the earlier one.
    pub fn from_outcomes(
        db: Database,
        outcomes: Vec<(String, Result<SheetLoad, LoadError>)>,
    ) -> Self {
        let mut summary = LoadSummary {
            db,
            collections: BTreeMap::new(),
            edge_definitions: Vec::new(),
            failures: Vec::new(),
            sheet_count: outcomes.len(),
            graph_created: None,
        };

        for (sheet, outcome) in outcomes {
            match outcome {
                Ok(load) => {
                    if let Some(def) = load.spec.edge_definition() {
                        summary
                            .edge_definitions
                            .retain(|d| d.collection != def.collection);
                        summary.edge_definitions.push(def);
                    }
                    if summary
                        .collections
                        .insert(load.spec.name.clone(), load.documents)
                        .is_some()
                    {
                        warn!(
                            "Collection '{}' was loaded by more than one worksheet; keeping the last",
                            load.spec.name
                        );
                    }
                }
                Err(error) => summary.failures.push(SheetFailure { sheet, error }),
            }
        }

        summary
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    /// All-or-nothing view: any failed worksheet turns the whole load into an error
    pub fn into_result(self) -> Result<Self, LoadError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(LoadError::Worksheets {
                failed: self.failures.len(),
                total: self.sheet_count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CollectionKind, Document, MemoryStore};
    use crate::loader::database::ensure_database;
    use crate::loader::worksheet::CollectionSpec;
    use serde_json::json;
    use std::sync::Arc;

    async fn db() -> Database {
        ensure_database(Arc::new(MemoryStore::new()), "db", false)
            .await
            .unwrap()
    }

    fn load(name: &str, kind: CollectionKind, keys: &[&str]) -> SheetLoad {
        let (from, to) = match kind {
            CollectionKind::Edge => (vec!["A".to_string()], vec!["B".to_string()]),
            CollectionKind::Document => (vec![], vec![]),
        };
        let documents = keys
            .iter()
            .map(|k| {
                let mut doc = Document::new();
                doc.insert("_key".to_string(), json!(k));
                (k.to_string(), doc)
            })
            .collect();
        SheetLoad {
            spec: CollectionSpec {
                name: name.to_string(),
                kind,
                from,
                to,
            },
            documents,
        }
    }

    #[tokio::test]
    async fn test_merge_by_collection_name() {
        let summary = LoadSummary::from_outcomes(
            db().await,
            vec![
                ("Person".to_string(), Ok(load("Person", CollectionKind::Document, &["a", "b"]))),
                ("Knows".to_string(), Ok(load("Knows", CollectionKind::Edge, &["1"]))),
            ],
        );
        assert!(summary.is_complete());
        assert_eq!(summary.db.name(), "db");
        assert_eq!(summary.sheet_count, 2);
        assert_eq!(summary.document_count(), 3);
        assert_eq!(summary.edge_definitions.len(), 1);
        assert_eq!(summary.edge_definitions[0].collection, "Knows");
    }

    #[tokio::test]
    async fn test_last_writer_wins_on_collision() {
        let summary = LoadSummary::from_outcomes(
            db().await,
            vec![
                ("first".to_string(), Ok(load("Person", CollectionKind::Document, &["a"]))),
                ("second".to_string(), Ok(load("Person", CollectionKind::Document, &["b"]))),
            ],
        );
        let person = &summary.collections["Person"];
        assert_eq!(person.len(), 1);
        assert!(person.contains_key("b"));
    }

    #[tokio::test]
    async fn test_failures_collected() {
        let summary = LoadSummary::from_outcomes(
            db().await,
            vec![
                ("Person".to_string(), Ok(load("Person", CollectionKind::Document, &["a"]))),
                (
                    "Bad".to_string(),
                    Err(LoadError::InvalidCollectionType {
                        sheet: "Bad".to_string(),
                        tag: "list".to_string(),
                    }),
                ),
            ],
        );
        assert!(!summary.is_complete());
        assert_eq!(summary.failures[0].sheet, "Bad");
        assert!(summary.collections.contains_key("Person"));

        match summary.into_result() {
            Err(LoadError::Worksheets { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
