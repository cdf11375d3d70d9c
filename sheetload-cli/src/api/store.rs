//! Document store abstraction
//!
//! Everything the loader needs from a database server, expressed as one trait
//! so the HTTP client and the in-memory store are interchangeable.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// A flat document as written to and read from the store
pub type Document = Map<String, Value>;

/// Errors raised by a [`DocumentStore`] implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure (connection refused, TLS, timeout)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("server returned {status} (errorNum {error_num}): {message}")]
    Api {
        status: u16,
        error_num: i64,
        message: String,
    },

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Some documents of a bulk insert were rejected
    #[error("{count} document(s) rejected, first error: {first}")]
    Rejected { count: usize, first: String },

    /// The store cannot satisfy the request (missing database/collection, key conflict)
    #[error("{0}")]
    Unavailable(String),
}

/// Kind of collection, with the numeric type ArangoDB uses on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Document,
    Edge,
}

impl CollectionKind {
    pub fn type_code(self) -> u8 {
        match self {
            CollectionKind::Document => 2,
            CollectionKind::Edge => 3,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Document => write!(f, "document"),
            CollectionKind::Edge => write!(f, "edge"),
        }
    }
}

/// One edge definition of a named graph
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// Operations the loader performs against a database server.
///
/// Database-scoped calls take the database name explicitly; the
/// [`Database`](crate::loader::Database) handle supplies it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError>;

    async fn create_database(&self, name: &str) -> Result<(), StoreError>;

    async fn drop_database(&self, name: &str) -> Result<(), StoreError>;

    async fn collection_exists(&self, database: &str, name: &str) -> Result<bool, StoreError>;

    async fn create_collection(
        &self,
        database: &str,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(), StoreError>;

    /// Insert all documents in one request and return their keys in input
    /// order, including keys assigned by the store.
    async fn insert_documents(
        &self,
        database: &str,
        collection: &str,
        documents: &[Document],
    ) -> Result<Vec<String>, StoreError>;

    /// Fetch the documents whose `_key` is in `keys`
    async fn documents_by_keys(
        &self,
        database: &str,
        collection: &str,
        keys: &[String],
    ) -> Result<Vec<Document>, StoreError>;

    async fn graph_exists(&self, database: &str, name: &str) -> Result<bool, StoreError>;

    async fn create_graph(
        &self,
        database: &str,
        name: &str,
        edge_definitions: &[EdgeDefinition],
    ) -> Result<(), StoreError>;
}
