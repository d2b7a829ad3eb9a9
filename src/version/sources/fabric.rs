//! Fabric meta API (v2) implementation
//!
//! Versions are game versions, builds are loader versions. The server jar is
//! addressed by game version, loader version and the newest installer.

use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Entry of `GET /v2/versions/game` and `GET /v2/versions/installer`
#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

/// Entry of `GET /v2/versions/loader/{game}`
#[derive(Debug, Deserialize)]
struct LoaderEntry {
    loader: VersionEntry,
}

/// Source implementation for meta.fabricmc.net
pub struct FabricSource {
    client: HttpClient,
    base_url: String,
}

impl FabricSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn latest_installer(&self) -> Result<String, SourceError> {
        let url = format!("{}/versions/installer", self.base_url);
        let installers: Vec<VersionEntry> = self.client.get_json(&url).await?;

        installers
            .into_iter()
            .next()
            .map(|entry| entry.version)
            .ok_or_else(|| SourceError::ShapeChanged(format!("{url}: no installer versions")))
    }
}

#[async_trait::async_trait]
impl VersionSource for FabricSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let url = format!("{}/versions/game", self.base_url);
        let games: Vec<VersionEntry> = self.client.get_json(&url).await?;

        Ok(games
            .into_iter()
            .map(|entry| VersionDescriptor::new(entry.version))
            .collect())
    }

    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        let url = format!("{}/versions/loader/{}", self.base_url, version);
        let loaders: Vec<LoaderEntry> = self.client.get_json(&url).await?;

        Ok(loaders
            .into_iter()
            .map(|entry| BuildDescriptor::new(entry.loader.version))
            .collect())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        let Some(loader) = &request.build else {
            return Ok(None);
        };
        let installer = self.latest_installer().await?;

        Ok(Some(DownloadTarget::Direct(format!(
            "{}/versions/loader/{}/{}/{}/server/jar",
            self.base_url, request.version.label, loader, installer
        ))))
    }
}
