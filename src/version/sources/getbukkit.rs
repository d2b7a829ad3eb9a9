//! getbukkit.org scraper for craftbukkit, spigot and the vanilla server
//!
//! The listing page has one card per version with a link to a detail page;
//! the artifact link is only on the detail page, so resolving a download
//! costs a second fetch.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::sources::absolute_url;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect("static selector is valid"));
    };
}

selector!(VERSION_HEADING, "#download > div > div > div > div > div > div > h2");
selector!(DOWNLOAD_BUTTON, "a.btn-download");
selector!(ARTIFACT_LINK, "#get-download > div > div > div:nth-child(2) > div > h2 > a");

/// Versions on the listing page, each pointing at its detail page
fn parse_listing(html: &str, page_url: &str) -> Result<Vec<VersionDescriptor>, SourceError> {
    let document = Html::parse_document(html);
    let mut versions = Vec::new();

    for heading in document.select(&VERSION_HEADING) {
        let label = heading.text().collect::<String>().trim().to_string();
        if label.is_empty() {
            continue;
        }

        let href = heading
            .parent()
            .and_then(|node| node.parent())
            .and_then(ElementRef::wrap)
            .and_then(|card| card.select(&DOWNLOAD_BUTTON).next())
            .and_then(|button| button.value().attr("href"));

        let descriptor = match href {
            Some(href) => VersionDescriptor::new(label).with_detail_url(absolute_url(page_url, href)?),
            None => {
                debug!("No download button for {} on {}", label, page_url);
                VersionDescriptor::new(label)
            }
        };
        versions.push(descriptor);
    }

    if versions.is_empty() {
        return Err(SourceError::ShapeChanged(format!(
            "{page_url}: no version headings"
        )));
    }
    Ok(versions)
}

/// Artifact link on a detail page
fn parse_detail(html: &str, page_url: &str) -> Result<String, SourceError> {
    let document = Html::parse_document(html);

    let href = document
        .select(&ARTIFACT_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| SourceError::ShapeChanged(format!("{page_url}: no artifact link")))?;

    absolute_url(page_url, href)
}

/// Source implementation for one getbukkit.org listing
pub struct GetBukkitSource {
    client: HttpClient,
    listing_url: String,
}

impl GetBukkitSource {
    /// `client` should send a browser User-Agent; getbukkit.org rejects others
    pub fn new(client: HttpClient, listing_url: &str) -> Self {
        Self {
            client,
            listing_url: listing_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for GetBukkitSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let body = self.client.get_text(&self.listing_url).await?;
        parse_listing(&body, &self.listing_url)
    }

    async fn fetch_builds(&self, _version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        Ok(Vec::new())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        let Some(detail_url) = &request.version.detail_url else {
            return Ok(None);
        };

        let body = self.client.get_text(detail_url).await?;
        let artifact = parse_detail(&body, detail_url)?;
        debug!("Resolved {} to {}", request.version.label, artifact);

        Ok(Some(DownloadTarget::Direct(artifact)))
    }
}
