//! Rift (archived project) with a fixed release table

use crate::version::error::SourceError;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Published releases, newest first, with their path under the CDN base
const RELEASES: [(&str, &str); 6] = [
    ("1.0.4-66", "2610/741/Rift-1.0.4-66.jar"),
    ("1.0.3-45", "2602/796/Rift-1.0.3-45.jar"),
    ("1.0.3-44", "2602/533/Rift-1.0.3-44.jar"),
    ("1.0.2-33", "2598/229/Rift-1.0.2-33.jar"),
    ("1.0.1", "2589/428/Rift-1.0.1.jar"),
    ("1.0.0-SNAPSHOT", "2579/932/Rift-1.0.0-SNAPSHOT.jar"),
];

/// Source implementation serving [`RELEASES`] without network access
pub struct RiftSource {
    base_url: String,
}

impl RiftSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for RiftSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        Ok(RELEASES
            .iter()
            .map(|(version, path)| {
                VersionDescriptor::new(*version).with_artifact_url(format!("{}/{path}", self.base_url))
            })
            .collect())
    }

    async fn fetch_builds(&self, _version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        Ok(Vec::new())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        Ok(request
            .version
            .artifact_url
            .clone()
            .map(DownloadTarget::Direct))
    }
}
