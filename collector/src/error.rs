use crate::coerce::CoercionError;
use jellyfin_exporter_config::ConfigError;

/// Why a single collector update failed. Never crosses into another collector's update.
#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    #[error("failed to resolve Jellyfin connection: {0}")]
    Config(#[from] ConfigError),
    #[error("unexpected response from {endpoint}: {source}")]
    Upstream {
        endpoint: String,
        #[source]
        source: UpstreamError,
    },
    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl CollectorError {
    pub(crate) fn upstream(endpoint: &str, source: impl Into<UpstreamError>) -> Self {
        Self::Upstream {
            endpoint: endpoint.to_string(),
            source: source.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error("cannot decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    #[error("{metric} expects {expected} label values, got {actual}")]
    LabelCount {
        metric: String,
        expected: usize,
        actual: usize,
    },
    #[error("sample channel closed")]
    SinkClosed,
}
