//! BungeeCord Jenkins implementation
//!
//! The `rssAll` Atom feed lists every CI build. Entry titles look like
//! `BungeeCord #1765 (stable)`; the second token is the version label.

use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: String,
}

/// Source implementation for ci.md-5.net
pub struct BungeeCordSource {
    client: HttpClient,
    base_url: String,
}

impl BungeeCordSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn artifact_url(&self, label: &str) -> String {
        format!(
            "{}/{}/artifact/bootstrap/target/BungeeCord.jar",
            self.base_url,
            label.trim_start_matches('#')
        )
    }
}

/// Extract `#1234` labels from the feed, in feed order
fn parse_feed(xml: &str) -> Result<Vec<String>, SourceError> {
    let feed: Feed = quick_xml::de::from_str(xml)?;

    if feed.entries.is_empty() {
        return Err(SourceError::ShapeChanged("feed has no entries".to_string()));
    }

    feed.entries
        .iter()
        .map(|entry| {
            entry
                .title
                .split(' ')
                .nth(1)
                .filter(|token| token.starts_with('#'))
                .map(str::to_string)
                .ok_or_else(|| {
                    SourceError::ShapeChanged(format!("unexpected entry title: {}", entry.title))
                })
        })
        .collect()
}

#[async_trait::async_trait]
impl VersionSource for BungeeCordSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let url = format!("{}/rssAll", self.base_url);
        let body = self.client.get_text(&url).await?;

        Ok(parse_feed(&body)?
            .into_iter()
            .map(|label| {
                let artifact = self.artifact_url(&label);
                VersionDescriptor::new(label).with_artifact_url(artifact)
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
