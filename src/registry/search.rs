use super::index::Dataset;

/// Normalized form of a list query: trimmed and lowercased.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn matches(ds: &Dataset, normalized_query: &str) -> bool {
    normalized_query.is_empty() || ds.haystack().to_lowercase().contains(normalized_query)
}

/// Datasets whose id, title, description or tags contain the query,
/// case-insensitively, in index order. An empty query keeps everything.
pub fn filter_datasets<'a>(datasets: &'a [Dataset], query: &str) -> Vec<&'a Dataset> {
    let q = normalize_query(query);
    datasets.iter().filter(|d| matches(d, &q)).collect()
}
