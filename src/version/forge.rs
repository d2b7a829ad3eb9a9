//! Forge artifact discovery
//!
//! Forge publishes no index of which artifact file exists for a build. Older
//! builds ship a `-server` jar or zip instead of an installer, and some only
//! exist on the legacy `files.minecraftforge.net` mirror. The resolver walks a
//! fixed list of candidates and returns the first that exists.

#[cfg(test)]
use mockall::automock;

use tracing::{debug, info};

use crate::version::http::HttpClient;

/// Primary Forge maven
pub const MAVEN_BASE_URL: &str = "https://maven.minecraftforge.net/net/minecraftforge/forge";

/// Legacy mirror
pub const CDN_BASE_URL: &str = "https://files.minecraftforge.net/maven/net/minecraftforge/forge";

/// Existence check for a candidate URL
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Returns true if the URL can be downloaded. Transport failures count as
    /// "does not exist".
    async fn exists(&self, url: &str) -> bool;
}

/// Probes with an HTTP HEAD request
pub struct HttpProber {
    client: HttpClient,
}

impl HttpProber {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn exists(&self, url: &str) -> bool {
        self.client
            .head_ok(url)
            .await
            .inspect_err(|e| debug!("Probe of {} failed: {}", url, e))
            .unwrap_or(false)
    }
}

/// Mirror half of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mirror {
    Maven,
    Cdn,
}

/// Artifact half of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Artifact {
    InstallerJar,
    ServerJar,
    InstallerZip,
    ServerZip,
}

impl Artifact {
    fn suffix(&self) -> &'static str {
        match self {
            Artifact::InstallerJar => "-installer.jar",
            Artifact::ServerJar => "-server.jar",
            Artifact::InstallerZip => "-installer.zip",
            Artifact::ServerZip => "-server.zip",
        }
    }
}

/// Probe order. Maven before the mirror; on maven jar before zip, on the
/// mirror installer before server.
const CANDIDATES: [(Mirror, Artifact); 8] = [
    (Mirror::Maven, Artifact::InstallerJar),
    (Mirror::Maven, Artifact::ServerJar),
    (Mirror::Maven, Artifact::InstallerZip),
    (Mirror::Maven, Artifact::ServerZip),
    (Mirror::Cdn, Artifact::InstallerJar),
    (Mirror::Cdn, Artifact::InstallerZip),
    (Mirror::Cdn, Artifact::ServerJar),
    (Mirror::Cdn, Artifact::ServerZip),
];

/// Finds the downloadable artifact for a Minecraft version / Forge build pair
pub struct ForgeUrlResolver<P: Prober> {
    prober: P,
    maven_base: String,
    cdn_base: String,
}

impl ForgeUrlResolver<HttpProber> {
    pub fn with_client(client: HttpClient) -> Self {
        Self::new(HttpProber::new(client))
    }
}

impl<P: Prober> ForgeUrlResolver<P> {
    pub fn new(prober: P) -> Self {
        Self::with_mirrors(prober, MAVEN_BASE_URL, CDN_BASE_URL)
    }

    pub fn with_mirrors(prober: P, maven_base: &str, cdn_base: &str) -> Self {
        Self {
            prober,
            maven_base: maven_base.trim_end_matches('/').to_string(),
            cdn_base: cdn_base.trim_end_matches('/').to_string(),
        }
    }

    /// All candidate URLs in probe order
    pub fn candidates(&self, mc_version: &str, forge_build: &str) -> Vec<String> {
        let coordinate = format!("{mc_version}-{forge_build}");
        CANDIDATES
            .iter()
            .map(|(mirror, artifact)| {
                let base = match mirror {
                    Mirror::Maven => &self.maven_base,
                    Mirror::Cdn => &self.cdn_base,
                };
                format!(
                    "{base}/{coordinate}/forge-{coordinate}{}",
                    artifact.suffix()
                )
            })
            .collect()
    }

    /// Probe candidates in order and return the first that exists, or `None`
    /// once all of them have failed.
    pub async fn resolve(&self, mc_version: &str, forge_build: &str) -> Option<String> {
        for url in self.candidates(mc_version, forge_build) {
            if self.prober.exists(&url).await {
                info!("Resolved Forge {}-{} to {}", mc_version, forge_build, url);
                return Some(url);
            }
        }

        info!(
            "No Forge artifact found for {}-{} after {} probes",
            mc_version,
            forge_build,
            CANDIDATES.len()
        );
        None
    }
}
