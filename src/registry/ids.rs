use std::sync::LazyLock;

use regex::Regex;

use super::error::{RegistryError, Result};

static DATASET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*/[a-z0-9][a-z0-9-]*$").unwrap());

pub fn is_valid_dataset_id(dataset_id: &str) -> bool {
    DATASET_ID.is_match(dataset_id)
}

pub fn validate_dataset_id(dataset_id: &str) -> Result<&str> {
    if is_valid_dataset_id(dataset_id) {
        Ok(dataset_id)
    } else {
        Err(RegistryError::InvalidDatasetId(dataset_id.to_string()))
    }
}

pub fn split_dataset_id(dataset_id: &str) -> Result<(&str, &str)> {
    let id = validate_dataset_id(dataset_id)?;
    // validated ids always contain exactly one '/'
    let (namespace, name) = id
        .split_once('/')
        .ok_or_else(|| RegistryError::InvalidDatasetId(id.to_string()))?;
    Ok((namespace, name))
}

/// Prefix under which the registry stores every artifact of a dataset.
///
/// Ids that fail validation still map to a path; only surrounding slashes
/// are trimmed.
pub fn dataset_prefix(dataset_id: &str) -> String {
    format!("datasets/{}", dataset_id.trim_matches('/'))
}

pub fn data_key(dataset_id: &str) -> String {
    format!("{}/data.parquet", dataset_prefix(dataset_id))
}

pub fn metadata_key(dataset_id: &str) -> String {
    format!("{}/metadata.json", dataset_prefix(dataset_id))
}

pub fn readme_key(dataset_id: &str) -> String {
    format!("{}/README.md", dataset_prefix(dataset_id))
}
