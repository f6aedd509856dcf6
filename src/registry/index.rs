use std::collections::{BTreeMap, HashSet};

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{RegistryError, Result};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_strings")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_strings")]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_u64")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_u64")]
    pub data_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_sha256: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Dataset {
    /// Tags and topics together, deduplicated, in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .chain(self.topics.iter())
            .map(String::as_str)
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .collect()
    }

    /// Text the list search matches against.
    pub fn haystack(&self) -> String {
        let mut s = format!(
            "{} {} {}",
            self.id,
            self.title.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or("")
        );
        for label in self.labels() {
            s.push(' ');
            s.push_str(label);
        }
        s
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.id,
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Index {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub datasets: Vec<Dataset>,
}

impl Index {
    /// Builds an index from an already-decoded JSON document.
    ///
    /// The document must be an object with a `datasets` array. Entries that are
    /// not objects, have no id, or repeat an earlier id are dropped.
    pub fn from_value(url: &str, value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(RegistryError::NotAnIndex(url.to_string()));
        };
        let Some(Value::Array(entries)) = obj.remove("datasets") else {
            return Err(RegistryError::NotAnIndex(url.to_string()));
        };
        let generated_at = obj
            .remove("generated_at")
            .and_then(|v| v.as_str().map(str::to_string));

        let mut seen = HashSet::new();
        let mut datasets = Vec::with_capacity(entries.len());
        for (pos, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Dataset>(entry) {
                Ok(ds) if ds.id.trim().is_empty() => {
                    warn!("index entry #{} has an empty id, skipping", pos);
                }
                Ok(ds) => {
                    if seen.insert(ds.id.clone()) {
                        datasets.push(ds);
                    } else {
                        warn!("duplicate dataset id '{}' in index, keeping first", ds.id);
                    }
                }
                Err(e) => warn!("index entry #{} skipped: {}", pos, e),
            }
        }

        Ok(Self { generated_at, datasets })
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u64))
}

pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
