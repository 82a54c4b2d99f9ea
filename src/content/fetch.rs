use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const CONTENT_INDEX_PATH: &str = "static/contentIndex.json";
pub const SOURCES_PATH: &str = "static/_config/sources.json";
pub const CATEGORIES_PATH: &str = "static/categories.json";
pub const CUSTOM_LINKS_PATH: &str = "static/customLinks.json";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("request for {path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("request for {path} failed")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Where the site's static documents are read from: an exported site directory
/// or the base URL it is served under.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    Directory(PathBuf),
    Http {
        base_url: String,
        client: reqwest::blocking::Client,
    },
}

impl DocumentSource {
    pub fn from_location(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::blocking::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .context("failed to build HTTP client")?;
            Ok(Self::Http {
                base_url: location.trim_end_matches('/').to_owned(),
                client,
            })
        } else {
            Ok(Self::Directory(PathBuf::from(location)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Directory(root) => root.display().to_string(),
            Self::Http { base_url, .. } => base_url.clone(),
        }
    }

    pub fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        match self {
            Self::Directory(root) => read_file(&root.join(path), path),
            Self::Http { base_url, client } => {
                let url = format!("{base_url}/{}", path.trim_start_matches('/'));
                let response = client.get(&url).send().map_err(|source| FetchError::Http {
                    path: path.to_owned(),
                    source,
                })?;

                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound(url));
                }
                if !status.is_success() {
                    return Err(FetchError::Status {
                        path: path.to_owned(),
                        status: status.as_u16(),
                    });
                }

                response.text().map_err(|source| FetchError::Http {
                    path: path.to_owned(),
                    source,
                })
            }
        }
    }

    pub fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let raw = self.fetch_text(path)?;
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {path}"))
    }

    /// Fetches a configuration document, substituting the default structure
    /// when it is missing or malformed.
    pub fn fetch_json_or_default<T: DeserializeOwned + Default>(&self, path: &str) -> T {
        match self.fetch_json(path) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("using defaults for {path}: {error:#}");
                T::default()
            }
        }
    }

    pub fn page_url(&self, slug: &str) -> String {
        match self {
            Self::Directory(root) => root.join(format!("{slug}.html")).display().to_string(),
            Self::Http { base_url, .. } => format!("{base_url}/{slug}"),
        }
    }
}

fn read_file(full_path: &Path, path: &str) -> Result<String, FetchError> {
    fs::read_to_string(full_path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            FetchError::NotFound(full_path.display().to_string())
        } else {
            FetchError::Io {
                path: path.to_owned(),
                source,
            }
        }
    })
}
