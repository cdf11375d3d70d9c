//! Document store access
//!
//! This module provides the [`DocumentStore`] seam the loader writes through,
//! an ArangoDB HTTP implementation, and an in-memory implementation for dry
//! runs.

pub mod client;
pub mod memory;
pub mod models;
pub mod store;

pub use client::ArangoClient;
pub use memory::MemoryStore;
pub use models::{Connection, Credentials};
pub use store::{CollectionKind, Document, DocumentStore, EdgeDefinition, StoreError};
