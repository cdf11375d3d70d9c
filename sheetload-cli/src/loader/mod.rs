//! Spreadsheet to ArangoDB loading
//!
//! Each visible worksheet becomes one collection. The sheet layout says whether
//! it is a document or an edge collection; rows from 6 onward become documents.

pub mod cell;
pub mod collection;
pub mod database;
pub mod document;
pub mod error;
pub mod graph;
pub mod summary;
pub mod workbook;
pub mod worksheet;

pub use collection::{KeyedDocuments, SheetLoad, load_worksheet};
pub use database::{Database, ensure_database};
pub use error::LoadError;
pub use summary::{LoadSummary, SheetFailure};
pub use workbook::{LoadOptions, load, load_with_store, load_worksheets, read_workbook};
pub use worksheet::{CollectionSpec, Worksheet};
