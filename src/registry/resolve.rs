use std::fmt;
use std::path::Path;

use log::{info, warn};
use url::Url;

use super::error::{RegistryError, Result};
use super::ids;
use super::index::{Dataset, Index};
use super::source::Fetcher;

pub const DEFAULT_INDEX_PATH: &str = "index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    Argument,
    Environment,
    Preference,
    Default,
}

impl fmt::Display for CandidateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CandidateOrigin::Argument => "argument",
            CandidateOrigin::Environment => "environment",
            CandidateOrigin::Preference => "stored preference",
            CandidateOrigin::Default => "default",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub origin: CandidateOrigin,
    pub location: String,
}

/// Index locations in resolution order. Blank and repeated entries are dropped.
pub fn candidates(
    argument: Option<&str>,
    environment: Option<&str>,
    preference: Option<&str>,
) -> Vec<Candidate> {
    let ordered = [
        (CandidateOrigin::Argument, argument),
        (CandidateOrigin::Environment, environment),
        (CandidateOrigin::Preference, preference),
        (CandidateOrigin::Default, Some(DEFAULT_INDEX_PATH)),
    ];

    let mut out: Vec<Candidate> = Vec::new();
    for (origin, location) in ordered {
        let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
            continue;
        };
        if out.iter().any(|c| c.location == location) {
            continue;
        }
        out.push(Candidate {
            origin,
            location: location.to_string(),
        });
    }
    out
}

/// Turns a user-supplied location into a URL. Anything without a scheme is a
/// filesystem path relative to `cwd`.
pub fn location_to_url(location: &str, cwd: &Path) -> Result<Url> {
    if let Ok(url) = Url::parse(location) {
        // single-letter schemes are windows drive letters
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }
    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    Url::from_file_path(&absolute).map_err(|_| RegistryError::InvalidUrl(location.to_string()))
}

/// Index URL with its final path segment removed.
pub fn base_url(index_url: &Url) -> Url {
    if index_url.cannot_be_a_base() {
        return index_url.clone();
    }
    let mut base = index_url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.join("./").unwrap_or(base)
}

/// Resolves an artifact key against the base URL. Keys are POSIX-style
/// relative paths; a leading slash is ignored.
pub fn artifact_url(base: &Url, key: &str) -> Result<Url> {
    let key = key.trim().trim_start_matches('/');
    base.join(key)
        .map_err(|_| RegistryError::InvalidUrl(format!("{}{}", base, key)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactUrls {
    pub data: Url,
    pub metadata: Url,
    pub preview: Option<Url>,
    pub schema: Option<Url>,
    pub readme: Url,
}

fn explicit_key(key: Option<&String>) -> Option<&str> {
    key.map(String::as_str).map(str::trim).filter(|k| !k.is_empty())
}

/// Explicit keys from the index entry win; otherwise the conventional
/// `datasets/<id>/...` layout is assumed. Preview and schema have no
/// conventional location.
pub fn artifact_urls(base: &Url, ds: &Dataset) -> Result<ArtifactUrls> {
    let data = match explicit_key(ds.data_key.as_ref()) {
        Some(k) => artifact_url(base, k)?,
        None => artifact_url(base, &ids::data_key(&ds.id))?,
    };
    let metadata = match explicit_key(ds.metadata_key.as_ref()) {
        Some(k) => artifact_url(base, k)?,
        None => artifact_url(base, &ids::metadata_key(&ds.id))?,
    };
    let readme = match explicit_key(ds.readme_key.as_ref()) {
        Some(k) => artifact_url(base, k)?,
        None => artifact_url(base, &ids::readme_key(&ds.id))?,
    };
    let preview = explicit_key(ds.preview_key.as_ref())
        .map(|k| artifact_url(base, k))
        .transpose()?;
    let schema = explicit_key(ds.schema_key.as_ref())
        .map(|k| artifact_url(base, k))
        .transpose()?;
    Ok(ArtifactUrls {
        data,
        metadata,
        preview,
        schema,
        readme,
    })
}

#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub origin: CandidateOrigin,
    pub url: Url,
    pub base: Url,
    pub index: Index,
}

#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub candidate: Candidate,
    pub reason: String,
}

pub async fn fetch_index(fetcher: &Fetcher, url: &Url) -> Result<Index> {
    let value = fetcher.get_json(url).await?;
    Index::from_value(url.as_str(), value)
}

/// Tries each candidate once, in order. The first one that yields an index wins.
pub async fn resolve_index(
    fetcher: &Fetcher,
    candidates: &[Candidate],
    cwd: &Path,
) -> std::result::Result<LoadedIndex, Vec<CandidateFailure>> {
    let mut failures = Vec::new();
    for candidate in candidates {
        let attempt = async {
            let url = location_to_url(&candidate.location, cwd)?;
            let index = fetch_index(fetcher, &url).await?;
            Ok::<_, RegistryError>((url, index))
        };
        match attempt.await {
            Ok((url, index)) => {
                info!(
                    "Loaded {} datasets from {} ({})",
                    index.len(),
                    url,
                    candidate.origin
                );
                return Ok(LoadedIndex {
                    origin: candidate.origin,
                    base: base_url(&url),
                    url,
                    index,
                });
            }
            Err(e) => {
                warn!("index candidate {} ({}) failed: {}", candidate.location, candidate.origin, e);
                failures.push(CandidateFailure {
                    candidate: candidate.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Err(failures)
}
