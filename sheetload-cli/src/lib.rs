//! Load spreadsheet workbooks into ArangoDB.
//!
//! The entry point is [`loader::load`]: it reads a workbook, provisions the
//! target database and turns every visible worksheet into a document or edge
//! collection.

pub mod api;
pub mod cli;
pub mod config;
pub mod loader;

pub use loader::{LoadError, LoadOptions, LoadSummary, load};
