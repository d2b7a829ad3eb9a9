//! bedrock.dev scraper for the Bedrock Dedicated Server
//!
//! The page's `#tag` dropdown lists releases newest first, each marked
//! `stable` or `beta`. Versions are keyed by OS bucket rather than by
//! release number.

use std::sync::LazyLock;

use indexmap::IndexMap;
use scraper::{Html, Selector};

use crate::version::error::SourceError;
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Host serving the server archives
pub const ARTIFACT_BASE_URL: &str = "https://minecraft.azureedge.net";

/// Buckets filled by `stable` options
const STABLE_BUCKETS: [&str; 2] = ["win", "linux"];

/// Buckets filled by `beta` options
const PREVIEW_BUCKETS: [&str; 2] = ["win-preview", "linux-preview"];

/// Every OS key callers may ask for
pub const OS_KEYS: [&str; 4] = ["win", "linux", "win-preview", "linux-preview"];

static TAG_OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#tag option").expect("static selector is valid"));

/// Zero-pad the build segment of a four-part version (`1.20.41.2` ->
/// `1.20.41.02`)
fn format_version(version: &str) -> String {
    let mut parts: Vec<String> = version.split('.').map(str::to_string).collect();
    if parts.len() >= 4 {
        let last = parts.len() - 1;
        parts[last] = format!("{:0>2}", parts[last]);
    }
    parts.join(".")
}

/// OS key -> release version, the last option of each channel wins
fn parse_tags(html: &str) -> IndexMap<&'static str, String> {
    let document = Html::parse_document(html);
    let mut buckets = IndexMap::new();

    for option in document.select(&TAG_OPTION) {
        let text = option.text().collect::<String>();
        let Some(version) = text.split_whitespace().next() else {
            continue;
        };
        let keys = match option.value().attr("value") {
            Some("stable") => STABLE_BUCKETS,
            Some("beta") => PREVIEW_BUCKETS,
            _ => continue,
        };
        let version = format_version(version);
        for key in keys {
            buckets.insert(key, version.clone());
        }
    }

    buckets
}

/// Source implementation for bedrock.dev
pub struct BedrockSource {
    client: HttpClient,
    page_url: String,
    artifact_base: String,
}

impl BedrockSource {
    pub fn new(client: HttpClient, page_url: &str) -> Self {
        Self::with_artifact_base(client, page_url, ARTIFACT_BASE_URL)
    }

    pub fn with_artifact_base(client: HttpClient, page_url: &str, artifact_base: &str) -> Self {
        Self {
            client,
            page_url: page_url.trim_end_matches('/').to_string(),
            artifact_base: artifact_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for BedrockSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        let body = self.client.get_text(&self.page_url).await?;
        let buckets = parse_tags(&body);

        if buckets.is_empty() {
            return Err(SourceError::ShapeChanged(format!(
                "{}: no stable or beta releases",
                self.page_url
            )));
        }

        Ok(buckets
            .into_iter()
            .map(|(os, version)| {
                let artifact = format!(
                    "{}/bin-{os}/bedrock-server-{version}.zip",
                    self.artifact_base
                );
                VersionDescriptor::new(os).with_artifact_url(artifact)
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
