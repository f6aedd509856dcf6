use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{0} is not an index document (missing `datasets` array)")]
    NotAnIndex(String),

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("unsupported url scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid dataset id; expected 'namespace/name' with lowercase letters, digits, '-'. got: '{0}'")]
    InvalidDatasetId(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
