use serde::{
    Deserialize,
    Deserializer,
};
use std::{
    path::PathBuf,
    time::Duration,
};
use url::Url;

/// Failure to work out where the Jellyfin API lives or how to authenticate against it.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no Jellyfin URL configured")]
    MissingUrl,
    #[error("no Jellyfin API token configured")]
    MissingToken,
    #[error("failed to read token file {path:?}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token file {0:?} is empty")]
    EmptyTokenFile(PathBuf),
}

/// Base URL and API token used for one scrape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub base_url: Url,
    pub token: String,
}

impl Connection {
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            base_url,
            token: token.into(),
        }
    }

    /// Appends `path` (which may carry a query string) to the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Resolves the connection info a collector needs at the start of every update.
pub trait ResolveConnection: Send + Sync {
    fn resolve(&self) -> Result<Connection, ConfigError>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct JellyfinSettings {
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for JellyfinSettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            token_file: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

impl ResolveConnection for JellyfinSettings {
    fn resolve(&self) -> Result<Connection, ConfigError> {
        let base_url = self.url.clone().ok_or(ConfigError::MissingUrl)?;

        if let Some(token) = self.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(Connection::new(base_url, token));
        }

        let Some(path) = &self.token_file else {
            return Err(ConfigError::MissingToken);
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::TokenFile {
            path: path.clone(),
            source,
        })?;
        let token = content.trim();
        if token.is_empty() {
            return Err(ConfigError::EmptyTokenFile(path.clone()));
        }
        trace!(path = ?path, "read API token from file");
        Ok(Connection::new(base_url, token))
    }
}
