//! Named graph over the loaded edge collections

use log::{debug, info};

use super::database::Database;
use super::error::LoadError;
use crate::api::EdgeDefinition;

/// Create `name` with the given edge definitions unless it already exists.
/// An existing graph is left as it is. Returns whether the graph was created.
pub async fn ensure_graph(
    db: &Database,
    name: &str,
    edge_definitions: &[EdgeDefinition],
) -> Result<bool, LoadError> {
    let created = db
        .ensure_graph(name, edge_definitions)
        .await
        .map_err(|source| LoadError::StoreWrite {
            collection: name.to_string(),
            source,
        })?;

    if created {
        info!(
            "Created graph '{}' with {} edge definition(s)",
            name,
            edge_definitions.len()
        );
    } else {
        debug!("Graph '{}' already exists", name);
    }
    Ok(created)
}
