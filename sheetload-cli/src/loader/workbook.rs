//! Workbook loading entry point
//!
//! Reads the whole workbook, provisions the database, loads every visible
//! worksheet concurrently and folds the per-sheet outcomes into one
//! [`LoadSummary`] once all of them have settled.

use std::path::Path;
use std::sync::Arc;

use calamine::{Reader, open_workbook_auto};
use futures::future::join_all;
use log::{debug, info, warn};

use super::collection::load_worksheet;
use super::database::ensure_database;
use super::error::LoadError;
use super::graph::ensure_graph;
use super::summary::LoadSummary;
use super::worksheet::Worksheet;
use crate::api::{ArangoClient, Connection, DocumentStore};

/// Options that change what a load does beyond writing documents
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Drop and recreate the database before loading
    pub clean: bool,
    /// Create a named graph over the loaded edge collections
    pub graph: Option<String>,
}

/// Read every worksheet of a workbook, in workbook order
pub fn read_workbook(path: &Path) -> Result<Vec<Worksheet>, LoadError> {
    let parse_error = |source| LoadError::WorkbookParse {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(parse_error)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut worksheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook.worksheet_range(&name).map_err(parse_error)?;
        worksheets.push(Worksheet::from_range(name, &range));
    }
    Ok(worksheets)
}

/// Load a workbook into an ArangoDB database
pub async fn load(
    path: &Path,
    database: &str,
    connection: &Connection,
    options: &LoadOptions,
) -> Result<LoadSummary, LoadError> {
    let worksheets = read_workbook(path)?;
    let client = ArangoClient::new(connection).map_err(|source| LoadError::Provisioning {
        database: database.to_string(),
        source,
    })?;
    load_worksheets(Arc::new(client), worksheets, database, options).await
}

/// Load a workbook through any [`DocumentStore`]
pub async fn load_with_store(
    store: Arc<dyn DocumentStore>,
    path: &Path,
    database: &str,
    options: &LoadOptions,
) -> Result<LoadSummary, LoadError> {
    let worksheets = read_workbook(path)?;
    load_worksheets(store, worksheets, database, options).await
}

/// Provision the database and load already parsed worksheets.
///
/// A failing worksheet does not stop the others; its error is recorded in the
/// summary. Provisioning and graph failures abort the load.
pub async fn load_worksheets(
    store: Arc<dyn DocumentStore>,
    worksheets: Vec<Worksheet>,
    database: &str,
    options: &LoadOptions,
) -> Result<LoadSummary, LoadError> {
    let db = ensure_database(store, database, options.clean).await?;

    let (hidden, visible): (Vec<_>, Vec<_>) =
        worksheets.into_iter().partition(Worksheet::is_hidden);
    for ws in &hidden {
        debug!("Skipping hidden worksheet '{}'", ws.name());
    }
    info!("Loading {} worksheet(s) into '{}'", visible.len(), database);

    let outcomes = join_all(visible.iter().map(|ws| {
        let db = &db;
        async move { (ws.name().to_string(), load_worksheet(db, ws).await) }
    }))
    .await;

    let mut summary = LoadSummary::from_outcomes(db.clone(), outcomes);
    for failure in &summary.failures {
        warn!("Worksheet '{}' failed: {}", failure.sheet, failure.error);
    }

    if let Some(graph) = &options.graph {
        if ensure_graph(&db, graph, &summary.edge_definitions).await? {
            summary.graph_created = Some(graph.clone());
        }
    }

    Ok(summary)
}
