use thiserror::Error;

use crate::provider::ProviderId;

/// Failure reading an upstream source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Invalid XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Upstream shape changed: {0}")]
    ShapeChanged(String),
}

/// Failure resolving versions, builds or download URLs
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream shape changed: {0}")]
    UpstreamShapeChanged(String),

    #[error("Version {version} not found for {provider}")]
    VersionNotFound {
        provider: ProviderId,
        version: String,
    },

    #[error("Build {build} not found for {provider} {version}")]
    BuildNotFound {
        provider: ProviderId,
        version: String,
        build: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Coarse classification of a [`ResolveError`] for callers that map errors
/// onto responses (400 / 404 / 500).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    NotFound,
    Upstream,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ResolveError::VersionNotFound { .. } | ResolveError::BuildNotFound { .. } => {
                ErrorKind::NotFound
            }
            ResolveError::UpstreamUnavailable(_) | ResolveError::UpstreamShapeChanged(_) => {
                ErrorKind::Upstream
            }
        }
    }

    /// True for lookup misses, which are expected outcomes rather than
    /// system failures
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<SourceError> for ResolveError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Network(_) | SourceError::Status { .. } | SourceError::RateLimited { .. } => {
                ResolveError::UpstreamUnavailable(err.to_string())
            }
            SourceError::Xml(_) | SourceError::ShapeChanged(_) => {
                ResolveError::UpstreamShapeChanged(err.to_string())
            }
        }
    }
}
