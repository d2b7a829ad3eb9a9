//! Forge maven-metadata implementation
//!
//! `maven-metadata.xml` lists every `{mc}-{forge}` coordinate, so one fetch
//! yields both the Minecraft versions and their builds. Artifacts are located
//! with [`ForgeUrlResolver`].

use indexmap::IndexMap;
use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::forge::{ForgeUrlResolver, HttpProber, Prober};
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

#[derive(Debug, Deserialize)]
struct Metadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    versions: Versions,
}

#[derive(Debug, Deserialize)]
struct Versions {
    #[serde(rename = "version", default)]
    version: Vec<String>,
}

/// Split a `{mc}-{build}` coordinate on its last hyphen, so hyphenated
/// Minecraft versions (`1.20.2-pre1`) stay intact. Legacy coordinates that
/// repeat the Minecraft version as a suffix (`1.7.10-10.13.4.1614-1.7.10`)
/// keep that suffix in the build.
fn split_coordinate(coordinate: &str) -> Option<(&str, &str)> {
    if let Some((mc, rest)) = coordinate.split_once('-') {
        if rest.rsplit_once('-').is_some_and(|(_, suffix)| suffix == mc) {
            return Some((mc, rest));
        }
    }
    coordinate.rsplit_once('-')
}

/// Group coordinates by Minecraft version, keeping metadata order
fn group_coordinates(coordinates: Vec<String>) -> Vec<VersionDescriptor> {
    let mut grouped: IndexMap<String, Vec<BuildDescriptor>> = IndexMap::new();

    for coordinate in coordinates {
        let Some((mc, build)) = split_coordinate(&coordinate) else {
            continue;
        };
        if mc.is_empty() || build.is_empty() {
            continue;
        }
        grouped
            .entry(mc.to_string())
            .or_default()
            .push(BuildDescriptor::new(build));
    }

    grouped
        .into_iter()
        .map(|(mc, builds)| VersionDescriptor::new(mc).with_builds(builds))
        .collect()
}

/// Source implementation for the Forge maven
pub struct ForgeSource<P: Prober = HttpProber> {
    client: HttpClient,
    metadata_url: String,
    resolver: ForgeUrlResolver<P>,
}

impl ForgeSource<HttpProber> {
    /// Creates a source reading `{base_url}/maven-metadata.xml` and probing
    /// the default maven with `base_url` as the legacy mirror
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let resolver = ForgeUrlResolver::with_mirrors(
            HttpProber::new(client.clone()),
            crate::version::forge::MAVEN_BASE_URL,
            base_url,
        );
        Self::with_resolver(client, base_url, resolver)
    }
}

impl<P: Prober> ForgeSource<P> {
    pub fn with_resolver(client: HttpClient, base_url: &str, resolver: ForgeUrlResolver<P>) -> Self {
        Self {
            client,
            metadata_url: format!("{}/maven-metadata.xml", base_url.trim_end_matches('/')),
            resolver,
        }
    }
}

#[async_trait::async_trait]
impl<P: Prober> VersionSource for ForgeSource<P> {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let body = self.client.get_text(&self.metadata_url).await?;
        let metadata: Metadata = quick_xml::de::from_str(&body)?;

        let versions = group_coordinates(metadata.versioning.versions.version);
        if versions.is_empty() {
            return Err(SourceError::ShapeChanged(format!(
                "{}: no forge coordinates",
                self.metadata_url
            )));
        }
        Ok(versions)
    }

    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        Ok(self
            .fetch_versions()
            .await?
            .into_iter()
            .find(|descriptor| descriptor.label == version)
            .and_then(|descriptor| descriptor.builds)
            .unwrap_or_default())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        let Some(build) = &request.build else {
            return Ok(None);
        };

        Ok(self
            .resolver
            .resolve(&request.version.label, &build.id)
            .await
            .map(DownloadTarget::Probed))
    }
}
