// Loading of combined schema detail files
use crate::error::FlattenResult;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Parse JSON text into a schema document, keeping object key order
pub fn parse_document(contents: &str) -> FlattenResult<Value> {
    let document: Value = serde_json::from_str(contents)?;
    Ok(document)
}

/// Read and parse a schema document from `path`
pub async fn load_document(path: impl AsRef<Path>) -> FlattenResult<Value> {
    let path = path.as_ref();
    debug!("Reading schema document from {:?}", path);

    let contents = tokio::fs::read_to_string(path).await?;
    let document = parse_document(&contents)?;

    let top_level_keys = document.as_object().map(|objects| objects.len()).unwrap_or(0);
    info!(
        bytes = contents.len(),
        top_level_keys = top_level_keys,
        "Loaded schema document from {:?}", path
    );

    Ok(document)
}
