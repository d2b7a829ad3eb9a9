//! PaperMC downloads API (v2) implementation
//!
//! Serves paper, velocity, waterfall and travertine, which differ only in
//! project name.

use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::sources::RawBuild;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Response from `GET /v2/projects/{project}`
#[derive(Debug, Deserialize)]
struct ProjectResponse {
    versions: Vec<String>,
}

/// Response from `GET /v2/projects/{project}/versions/{version}`
#[derive(Debug, Deserialize)]
struct VersionResponse {
    builds: Vec<RawBuild>,
}

/// Source implementation for one PaperMC project
pub struct PaperSource {
    client: HttpClient,
    base_url: String,
    project: String,
}

impl PaperSource {
    /// Creates a PaperSource for `project` rooted at `base_url`
    /// (e.g. `https://api.papermc.io/v2/projects/paper`)
    pub fn new(client: HttpClient, base_url: &str, project: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for PaperSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let project: ProjectResponse = self.client.get_json(&self.base_url).await?;

        Ok(project
            .versions
            .into_iter()
            .map(VersionDescriptor::new)
            .collect())
    }

    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        let url = format!("{}/versions/{}", self.base_url, version);
        let response: VersionResponse = self.client.get_json(&url).await?;

        Ok(response.builds.into_iter().map(Into::into).collect())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        let Some(build) = &request.build else {
            return Ok(None);
        };
        let version = &request.version.label;

        Ok(Some(DownloadTarget::Direct(format!(
            "{}/versions/{version}/builds/{build}/downloads/{}-{version}-{build}.jar",
            self.base_url, self.project
        ))))
    }
}
