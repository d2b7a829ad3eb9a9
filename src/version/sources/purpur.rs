//! Purpur API (v2) implementation

use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::sources::RawBuild;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Response from `GET /v2/purpur`
#[derive(Debug, Deserialize)]
struct ProjectResponse {
    versions: Vec<String>,
}

/// Response from `GET /v2/purpur/{version}`
#[derive(Debug, Deserialize)]
struct VersionResponse {
    builds: Builds,
}

#[derive(Debug, Deserialize)]
struct Builds {
    all: Vec<RawBuild>,
}

/// Source implementation for api.purpurmc.org
pub struct PurpurSource {
    client: HttpClient,
    base_url: String,
}

impl PurpurSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for PurpurSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let project: ProjectResponse = self.client.get_json(&self.base_url).await?;

        Ok(project
            .versions
            .into_iter()
            .map(VersionDescriptor::new)
            .collect())
    }

    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        let url = format!("{}/{}", self.base_url, version);
        let response: VersionResponse = self.client.get_json(&url).await?;

        Ok(response.builds.all.into_iter().map(Into::into).collect())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        let Some(build) = &request.build else {
            return Ok(None);
        };

        Ok(Some(DownloadTarget::Direct(format!(
            "{}/{}/{}/download",
            self.base_url, request.version.label, build
        ))))
    }
}
