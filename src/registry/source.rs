use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::error::{RegistryError, Result};

#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>>;
    fn source_id(&self) -> String;
}

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("opendata-browser/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactSource for HttpSource {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| RegistryError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body.to_vec())
    }

    fn source_id(&self) -> String {
        "http".to_string()
    }
}

pub struct FileSource;

#[async_trait]
impl ArtifactSource for FileSource {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let path = url
            .to_file_path()
            .map_err(|_| RegistryError::InvalidUrl(url.to_string()))?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("read {} -> {} bytes", path.display(), bytes.len());
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RegistryError::NotFound(url.to_string()))
            }
            Err(source) => Err(RegistryError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    fn source_id(&self) -> String {
        "file".to_string()
    }
}

/// Picks a source by URL scheme.
pub struct Fetcher {
    http: HttpSource,
    file: FileSource,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpSource::new(timeout)?,
            file: FileSource,
        })
    }

    fn source_for(&self, url: &Url) -> Result<&dyn ArtifactSource> {
        match url.scheme() {
            "http" | "https" => Ok(&self.http),
            "file" => Ok(&self.file),
            other => Err(RegistryError::UnsupportedScheme(other.to_string())),
        }
    }

    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let source = self.source_for(url)?;
        debug!("fetch via {}: {}", source.source_id(), url);
        source.get_bytes(url).await
    }

    pub async fn get_json(&self, url: &Url) -> Result<Value> {
        let bytes = self.get_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|source| RegistryError::Parse {
            url: url.to_string(),
            source,
        })
    }

    pub async fn get_text(&self, url: &Url) -> Result<String> {
        let bytes = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
