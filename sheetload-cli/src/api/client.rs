//! ArangoDB HTTP client
//!
//! Implements [`DocumentStore`] on top of the ArangoDB REST API using a single
//! pooled `reqwest::Client`. Cloning is cheap and all clones share the pool.

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::models::{Connection, Credentials};
use super::store::{CollectionKind, Document, DocumentStore, EdgeDefinition, StoreError};

const SYSTEM_DATABASE: &str = "_system";
const CURSOR_BATCH_SIZE: usize = 1000;

const KEYS_QUERY: &str = "FOR doc IN @@collection FILTER doc._key IN @keys RETURN doc";

#[derive(Debug, Clone)]
pub struct ArangoClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorNum", default)]
    error_num: i64,
    #[serde(rename = "errorMessage", default)]
    error_message: String,
}

#[derive(Debug, Deserialize)]
struct DatabaseList {
    result: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CursorPage {
    #[serde(default)]
    result: Vec<Document>,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
    id: Option<String>,
}

/// One entry of a bulk insert response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsertOutcome {
    Failed {
        error: bool,
        #[serde(rename = "errorNum", default)]
        error_num: i64,
        #[serde(rename = "errorMessage", default)]
        error_message: String,
    },
    Created {
        #[serde(rename = "_key")]
        key: String,
    },
}

impl ArangoClient {
    pub fn new(connection: &Connection) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(connection.timeout).build()?;
        Ok(Self {
            http,
            base_url: connection.endpoint.trim_end_matches('/').to_string(),
            credentials: connection.credentials.clone(),
        })
    }

    fn url(&self, database: &str, path: &str) -> String {
        format!(
            "{}/_db/{}/_api/{}",
            self.base_url,
            urlencoding::encode(database),
            path
        )
    }

    fn request(&self, method: Method, database: &str, path: &str) -> RequestBuilder {
        let url = self.url(database, path);
        trace!("{} {}", method, url);
        self.http
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// Send a request and return status and decoded body without judging the status
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, Value), StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };
        Ok((status, value))
    }

    /// Send a request and turn any non-success status into [`StoreError::Api`]
    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let (status, value) = self.execute(request).await?;
        if status.is_success() {
            Ok(value)
        } else {
            Err(api_error(status, value))
        }
    }

    /// GET a resource and report whether it exists
    async fn exists(&self, database: &str, path: &str) -> Result<bool, StoreError> {
        let (status, value) = self
            .execute(self.request(Method::GET, database, path))
            .await?;
        match status {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(api_error(s, value)),
        }
    }
}

fn api_error(status: StatusCode, body: Value) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_value(body).ok();
    let (error_num, message) = match parsed {
        Some(e) => (e.error_num, e.error_message),
        None => (0, status.canonical_reason().unwrap_or("unknown").to_string()),
    };
    StoreError::Api {
        status: status.as_u16(),
        error_num,
        message,
    }
}

#[async_trait]
impl DocumentStore for ArangoClient {
    async fn list_databases(&self) -> Result<Vec<String>, StoreError> {
        let body = self
            .send(self.request(Method::GET, SYSTEM_DATABASE, "database"))
            .await?;
        let list: DatabaseList = serde_json::from_value(body)?;
        Ok(list.result)
    }

    async fn create_database(&self, name: &str) -> Result<(), StoreError> {
        debug!("Creating database '{}'", name);
        self.send(
            self.request(Method::POST, SYSTEM_DATABASE, "database")
                .json(&json!({ "name": name })),
        )
        .await?;
        Ok(())
    }

    async fn drop_database(&self, name: &str) -> Result<(), StoreError> {
        debug!("Dropping database '{}'", name);
        let path = format!("database/{}", urlencoding::encode(name));
        self.send(self.request(Method::DELETE, SYSTEM_DATABASE, &path))
            .await?;
        Ok(())
    }

    async fn collection_exists(&self, database: &str, name: &str) -> Result<bool, StoreError> {
        let path = format!("collection/{}", urlencoding::encode(name));
        self.exists(database, &path).await
    }

    async fn create_collection(
        &self,
        database: &str,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(), StoreError> {
        debug!("Creating {} collection '{}' in '{}'", kind, name, database);
        self.send(
            self.request(Method::POST, database, "collection")
                .json(&json!({ "name": name, "type": kind.type_code() })),
        )
        .await?;
        Ok(())
    }

    async fn insert_documents(
        &self,
        database: &str,
        collection: &str,
        documents: &[Document],
    ) -> Result<Vec<String>, StoreError> {
        let path = format!("document/{}", urlencoding::encode(collection));
        let body = self
            .send(self.request(Method::POST, database, &path).json(documents))
            .await?;
        let outcomes: Vec<InsertOutcome> = serde_json::from_value(body)?;

        let mut keys = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                InsertOutcome::Created { key } => keys.push(key),
                InsertOutcome::Failed {
                    error: true,
                    error_num,
                    error_message,
                } => failures.push(format!("{} (errorNum {})", error_message, error_num)),
                InsertOutcome::Failed { .. } => {}
            }
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
        let query = json!({
            "query": KEYS_QUERY,
            "bindVars": { "@collection": collection, "keys": keys },
            "batchSize": CURSOR_BATCH_SIZE,
        });
        let body = self
            .send(self.request(Method::POST, database, "cursor").json(&query))
            .await?;
        let mut page: CursorPage = serde_json::from_value(body)?;
        let mut documents = std::mem::take(&mut page.result);

        while page.has_more {
            let Some(id) = page.id.take() else {
                break;
            };
            let path = format!("cursor/{}", urlencoding::encode(&id));
            let body = self.send(self.request(Method::PUT, database, &path)).await?;
            page = serde_json::from_value(body)?;
            documents.append(&mut page.result);
        }

        Ok(documents)
    }

    async fn graph_exists(&self, database: &str, name: &str) -> Result<bool, StoreError> {
        let path = format!("gharial/{}", urlencoding::encode(name));
        self.exists(database, &path).await
    }

    async fn create_graph(
        &self,
        database: &str,
        name: &str,
        edge_definitions: &[EdgeDefinition],
    ) -> Result<(), StoreError> {
        debug!(
            "Creating graph '{}' with {} edge definition(s)",
            name,
            edge_definitions.len()
        );
        self.send(
            self.request(Method::POST, database, "gharial")
                .json(&json!({ "name": name, "edgeDefinitions": edge_definitions })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ArangoClient {
        ArangoClient::new(&Connection::new(endpoint, Credentials::new("root", "pw"))).unwrap()
    }

    #[test]
    fn test_url_building() {
        let c = client("http://localhost:8529/");
        assert_eq!(
            c.url("_system", "database"),
            "http://localhost:8529/_db/_system/_api/database"
        );
        assert_eq!(
            c.url("my db", "collection/Person"),
            "http://localhost:8529/_db/my%20db/_api/collection/Person"
        );
    }

    #[test]
    fn test_api_error_from_body() {
        let err = api_error(
            StatusCode::CONFLICT,
            json!({ "error": true, "errorNum": 1210, "errorMessage": "unique constraint violated" }),
        );
        match err {
            StoreError::Api {
                status,
                error_num,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(error_num, 1210);
                assert_eq!(message, "unique constraint violated");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_without_body() {
        let err = api_error(StatusCode::UNAUTHORIZED, Value::Null);
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_insert_outcome_parsing() {
        let outcomes: Vec<InsertOutcome> = serde_json::from_value(json!([
            { "_id": "Person/a", "_key": "a", "_rev": "_x" },
            { "error": true, "errorNum": 1210, "errorMessage": "unique constraint violated" }
        ]))
        .unwrap();
        assert!(matches!(&outcomes[0], InsertOutcome::Created { key } if key == "a"));
        assert!(matches!(
            &outcomes[1],
            InsertOutcome::Failed { error: true, error_num: 1210, .. }
        ));
    }

    #[test]
    fn test_cursor_page_parsing() {
        let page: CursorPage = serde_json::from_value(json!({
            "result": [{ "_key": "a" }],
            "hasMore": true,
            "id": "12345",
            "cached": false
        }))
        .unwrap();
        assert_eq!(page.result.len(), 1);
        assert!(page.has_more);
        assert_eq!(page.id.as_deref(), Some("12345"));
    }
}
