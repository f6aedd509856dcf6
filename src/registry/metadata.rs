use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::index::{value_as_u64, Dataset};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Preview {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

impl Preview {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let columns: Vec<String> = obj
            .get("columns")?
            .as_array()?
            .iter()
            .filter_map(|c| match c {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect();
        let rows = obj
            .get("rows")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();
        Some(Self { columns, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cell text for display: strings unquoted, null/missing as empty.
    pub fn cell(&self, row: usize, column: &str) -> String {
        match self.rows.get(row).and_then(|r| r.get(column)) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn truncated(&self, max_rows: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(max_rows).cloned().collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let columns = parse_columns(obj.get("columns")?)?;
        Some(Self {
            format: obj.get("format").and_then(Value::as_str).map(str::to_string),
            columns,
        })
    }
}

fn parse_columns(value: &Value) -> Option<Vec<Column>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|c| match c {
                Value::String(s) => Some(Column { name: s.clone(), dtype: None }),
                Value::Object(o) => {
                    let name = o.get("name").and_then(Value::as_str)?;
                    Some(Column {
                        name: name.to_string(),
                        dtype: o.get("type").and_then(Value::as_str).map(str::to_string),
                    })
                }
                _ => None,
            })
            .collect(),
    )
}

/// Per-dataset `metadata.json`. Kept as raw JSON, fields are read on demand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub raw: Map<String, Value>,
}

impl Metadata {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(raw) => Self { raw },
            _ => Self::default(),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn format(&self) -> Option<&str> {
        self.str_field("format")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.str_field("updated_at")
    }

    pub fn data_key(&self) -> Option<&str> {
        self.str_field("data_key")
    }

    pub fn row_count(&self) -> Option<u64> {
        self.raw.get("row_count").and_then(value_as_u64)
    }

    pub fn data_size_bytes(&self) -> Option<u64> {
        self.raw.get("data_size_bytes").and_then(value_as_u64)
    }

    pub fn columns(&self) -> Option<Vec<Column>> {
        self.raw.get("columns").and_then(parse_columns)
    }

    pub fn preview(&self) -> Option<Preview> {
        self.raw.get("preview").and_then(Preview::from_value)
    }

    pub fn source(&self) -> Option<&Value> {
        self.raw.get("source").filter(|v| !v.is_null())
    }

    pub fn geo(&self) -> Option<&Value> {
        self.raw.get("geo").filter(|v| !v.is_null())
    }

    pub fn schema(&self) -> Option<Schema> {
        let columns = self.columns()?;
        Some(Schema {
            format: self.format().map(str::to_string),
            columns,
        })
    }
}

/// Header facts of the detail view: index entry first, metadata as fallback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailFacts {
    pub updated_at: Option<String>,
    pub row_count: Option<u64>,
    pub data_size_bytes: Option<u64>,
    pub license: Option<String>,
    pub frequency: Option<String>,
    pub format: Option<String>,
    pub version: Option<String>,
    pub columns: Vec<String>,
    pub source: Option<String>,
    pub geo: Option<String>,
    /// Data artifact key; the conventional layout applies when neither side has one.
    pub data_key: Option<String>,
}

impl DetailFacts {
    pub fn from_entry(ds: &Dataset) -> Self {
        Self {
            updated_at: ds.updated_at.clone(),
            row_count: ds.row_count,
            data_size_bytes: ds.data_size_bytes,
            license: ds.license.clone(),
            frequency: ds.frequency.clone(),
            source: ds.source.as_ref().and_then(describe_value),
            geo: ds.geo.as_ref().and_then(describe_value),
            data_key: ds
                .data_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            ..Default::default()
        }
    }

    pub fn merge_metadata(&mut self, meta: &Metadata) {
        if self.updated_at.is_none() {
            self.updated_at = meta.updated_at().map(str::to_string);
        }
        if self.row_count.is_none() {
            self.row_count = meta.row_count();
        }
        if self.data_size_bytes.is_none() {
            self.data_size_bytes = meta.data_size_bytes();
        }
        if self.source.is_none() {
            self.source = meta.source().and_then(describe_value);
        }
        if self.geo.is_none() {
            self.geo = meta.geo().and_then(describe_value);
        }
        if self.data_key.is_none() {
            self.data_key = meta.data_key().map(|k| k.trim().to_string());
        }
        self.format = meta.format().map(str::to_string);
        self.version = meta.version().map(str::to_string);
        if let Some(cols) = meta.columns() {
            self.columns = cols.into_iter().map(|c| c.name).collect();
        }
    }
}

/// One-line description of a free-form `source`/`geo` value.
pub fn describe_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => {
            let name = obj.get("name").and_then(Value::as_str);
            let url = obj.get("url").and_then(Value::as_str);
            match (name, url) {
                (Some(n), Some(u)) => Some(format!("{} ({})", n, u)),
                (Some(n), None) => Some(n.to_string()),
                (None, Some(u)) => Some(u.to_string()),
                (None, None) => {
                    let parts: Vec<String> = obj
                        .iter()
                        .filter(|(_, v)| !v.is_null())
                        .map(|(k, v)| match v {
                            Value::String(s) => format!("{}={}", k, s),
                            other => format!("{}={}", k, other),
                        })
                        .collect();
                    if parts.is_empty() {
                        None
                    } else {
                        Some(parts.join(", "))
                    }
                }
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_from_value() {
        let v = json!({
            "columns": ["date", "rate"],
            "rows": [{"date": "2026-01-02", "rate": 1.09}, {"date": null}, "junk"]
        });
        let p = Preview::from_value(&v).unwrap();
        assert_eq!(p.columns, vec!["date", "rate"]);
        assert_eq!(p.rows.len(), 2);
        assert_eq!(p.cell(0, "date"), "2026-01-02");
        assert_eq!(p.cell(0, "rate"), "1.09");
        assert_eq!(p.cell(1, "date"), "");
        assert_eq!(p.cell(1, "rate"), "");
        assert_eq!(p.cell(9, "rate"), "");
        assert_eq!(p.truncated(1).rows.len(), 1);
    }

    #[test]
    fn test_preview_without_columns_is_none() {
        assert!(Preview::from_value(&json!({"rows": []})).is_none());
        assert!(Preview::from_value(&json!("x")).is_none());
        assert!(Preview::from_value(&json!({"columns": []})).unwrap().is_empty());
    }

    #[test]
    fn test_schema_from_value() {
        let v = json!({"format": "parquet", "columns": [{"name": "a", "type": "int64"}, "b", 7]});
        let s = Schema::from_value(&v).unwrap();
        assert_eq!(s.format.as_deref(), Some("parquet"));
        assert_eq!(s.columns.len(), 2);
        assert_eq!(s.columns[0].dtype.as_deref(), Some("int64"));
        assert_eq!(s.columns[1].name, "b");
        assert!(s.columns[1].dtype.is_none());
    }

    #[test]
    fn test_merge_prefers_index_entry() {
        let ds = Dataset {
            id: "a/b".into(),
            row_count: Some(10),
            license: Some("CC-BY-4.0".into()),
            ..Default::default()
        };
        let meta = Metadata::from_value(json!({
            "format": "parquet",
            "row_count": 99,
            "data_size_bytes": 4096,
            "updated_at": "2026-02-01T00:00:00Z",
            "columns": [{"name": "x", "type": "double"}, {"name": "y"}],
            "source": {"name": "FRED", "url": "https://fred.stlouisfed.org"}
        }));
        let mut facts = DetailFacts::from_entry(&ds);
        facts.merge_metadata(&meta);
        assert_eq!(facts.row_count, Some(10));
        assert_eq!(facts.data_size_bytes, Some(4096));
        assert_eq!(facts.updated_at.as_deref(), Some("2026-02-01T00:00:00Z"));
        assert_eq!(facts.format.as_deref(), Some("parquet"));
        assert_eq!(facts.columns, vec!["x", "y"]);
        assert_eq!(facts.source.as_deref(), Some("FRED (https://fred.stlouisfed.org)"));
        assert_eq!(facts.license.as_deref(), Some("CC-BY-4.0"));
        assert!(facts.data_key.is_none());
    }

    #[test]
    fn test_data_key_from_metadata_when_entry_has_none() {
        let meta = Metadata::from_value(json!({"data_key": "datasets/a/b/2026-03-01/data.parquet"}));

        let mut facts = DetailFacts::from_entry(&Dataset {
            id: "a/b".into(),
            ..Default::default()
        });
        facts.merge_metadata(&meta);
        assert_eq!(facts.data_key.as_deref(), Some("datasets/a/b/2026-03-01/data.parquet"));

        let mut facts = DetailFacts::from_entry(&Dataset {
            id: "a/b".into(),
            data_key: Some("datasets/a/b/latest.parquet".into()),
            ..Default::default()
        });
        facts.merge_metadata(&meta);
        assert_eq!(facts.data_key.as_deref(), Some("datasets/a/b/latest.parquet"));
    }

    #[test]
    fn test_non_object_metadata_is_empty() {
        let meta = Metadata::from_value(json!([1, 2]));
        assert!(meta.raw.is_empty());
        assert!(meta.preview().is_none());
        assert!(meta.schema().is_none());
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(&json!(null)), None);
        assert_eq!(describe_value(&json!("")), None);
        assert_eq!(describe_value(&json!("USGS")), Some("USGS".into()));
        assert_eq!(
            describe_value(&json!({"lat": 52.52, "lon": 13.41})),
            Some("lat=52.52, lon=13.41".into())
        );
        assert_eq!(describe_value(&json!({})), None);
    }
}
