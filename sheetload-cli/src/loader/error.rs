//! Errors raised while loading a workbook

use std::path::PathBuf;

use crate::api::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Listing, dropping or creating the target database failed
    #[error("failed to provision database '{database}': {source}")]
    Provisioning {
        database: String,
        #[source]
        source: StoreError,
    },

    /// The workbook file could not be opened or parsed
    #[error("failed to read workbook {}: {source}", .path.display())]
    WorkbookParse {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Cell B1 of a worksheet is neither `doc` nor `edge`
    #[error("unsupported collection type in worksheet '{sheet}': '{tag}'")]
    InvalidCollectionType { sheet: String, tag: String },

    /// Creating a collection or graph, or inserting documents, failed
    #[error("failed to write '{collection}': {source}")]
    StoreWrite {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Re-reading inserted documents failed
    #[error("failed to read back '{collection}': {source}")]
    StoreRead {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// One or more worksheets failed while the others were loaded
    #[error("{failed} of {total} worksheet(s) failed to load")]
    Worksheets { failed: usize, total: usize },
}
