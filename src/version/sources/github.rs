//! GitHub Releases API implementation
//!
//! Used by forks that publish server jars as release assets. Each release tag
//! is a version; its first `.jar` asset is the artifact.

use serde::Deserialize;
use tracing::debug;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Response from GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// Source implementation for one repository's releases
pub struct GitHubReleasesSource {
    client: HttpClient,
    releases_url: String,
}

impl GitHubReleasesSource {
    /// Creates a source reading `releases_url`
    /// (e.g. `https://api.github.com/repos/LeavesMC/Leaves/releases`)
    pub fn new(client: HttpClient, releases_url: &str) -> Self {
        Self {
            client,
            releases_url: releases_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for GitHubReleasesSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let releases: Vec<Release> = self
            .client
            .get_json_with_headers(
                &self.releases_url,
                &[("Accept", "application/vnd.github+json")],
            )
            .await?;

        Ok(releases
            .into_iter()
            .filter_map(|release| {
                let jar = release
                    .assets
                    .into_iter()
                    .find(|asset| asset.name.ends_with(".jar"));
                match jar {
                    Some(asset) => Some(
                        VersionDescriptor::new(release.tag_name.to_lowercase())
                            .with_artifact_url(asset.browser_download_url),
                    ),
                    None => {
                        debug!("Skipping release {} without a jar asset", release.tag_name);
                        None
                    }
                }
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
