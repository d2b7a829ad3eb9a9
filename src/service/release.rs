//! Release resolution facade
//!
//! Every operation goes through the [`ReleaseCache`]: version lists and build
//! lists are fetched at most once per time-to-live, and getbukkit download
//! links are cached per version.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::provider::{PROVIDERS, ProviderId};
use crate::service::registry::{ProviderRegistry, RegisteredProvider, create_default_registry};
use crate::version::cache::ReleaseCache;
use crate::version::compare::{compare_versions, order_labels};
use crate::version::error::ResolveError;
use crate::version::sources::bedrock::OS_KEYS;
use crate::version::types::{
    BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor, VersionSet,
};

/// Newest version of a provider and, where the provider has builds, its
/// newest build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestRelease {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

fn not_found(provider: ProviderId, version: &str, build: Option<&str>) -> ResolveError {
    match build {
        Some(build) => ResolveError::BuildNotFound {
            provider,
            version: version.to_string(),
            build: build.to_string(),
        },
        None => ResolveError::VersionNotFound {
            provider,
            version: version.to_string(),
        },
    }
}

/// Lists versions and builds and resolves download URLs for every registered
/// provider
pub struct ReleaseService {
    registry: ProviderRegistry,
    cache: ReleaseCache,
}

impl ReleaseService {
    pub fn new(registry: ProviderRegistry, cache: ReleaseCache) -> Self {
        Self { registry, cache }
    }

    /// Service over every enabled provider with a fresh cache
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(create_default_registry(config), ReleaseCache::new())
    }

    /// Registered providers in table order
    pub fn providers(&self) -> Vec<ProviderId> {
        PROVIDERS
            .iter()
            .map(|provider| provider.id)
            .filter(|id| self.registry.contains_key(id))
            .collect()
    }

    fn lookup(&self, provider: &str) -> Result<&RegisteredProvider, ResolveError> {
        let name = provider.trim();
        if name.is_empty() {
            return Err(ResolveError::InvalidParameter("missing provider".to_string()));
        }

        name.parse::<ProviderId>()
            .ok()
            .and_then(|id| self.registry.get(&id))
            .ok_or_else(|| ResolveError::InvalidParameter(format!("unknown provider: {name}")))
    }

    async fn version_set(
        &self,
        provider: &RegisteredProvider,
    ) -> Result<Arc<VersionSet>, ResolveError> {
        let id = provider.id();
        let order = provider.descriptor().order;
        let source = provider.source();

        self.cache
            .versions(id, provider.ttl_ms(), move || async move {
                let mut descriptors = source.fetch_versions().await.map_err(|e| {
                    warn!("Failed to fetch versions for {}: {}", id, e);
                    ResolveError::from(e)
                })?;
                order_labels(&mut descriptors, order, |d| d.label.as_str());
                Ok(VersionSet::new(descriptors))
            })
            .await
    }

    async fn builds_of(
        &self,
        provider: &RegisteredProvider,
        descriptor: &VersionDescriptor,
    ) -> Result<Arc<Vec<BuildDescriptor>>, ResolveError> {
        let id = provider.id();
        let source = provider.source();

        self.cache
            .builds(id, &descriptor.label, provider.ttl_ms(), move || async move {
                let mut builds = match &descriptor.builds {
                    Some(builds) => builds.clone(),
                    None => source.fetch_builds(&descriptor.label).await.map_err(|e| {
                        warn!("Failed to fetch builds for {} {}: {}", id, descriptor.label, e);
                        ResolveError::from(e)
                    })?,
                };
                builds.sort_by(|a, b| compare_versions(&a.id, &b.id));
                Ok(builds)
            })
            .await
    }

    /// Pick the requested version (normalized), or the first listed one
    fn select_version(
        provider: &RegisteredProvider,
        set: &VersionSet,
        requested: Option<&str>,
    ) -> Result<VersionDescriptor, ResolveError> {
        let id = provider.id();
        let label = match id.normalize_version(requested) {
            Some(label) => label,
            None => set
                .latest()
                .map(|latest| latest.label.clone())
                .ok_or_else(|| not_found(id, "latest", None))?,
        };

        if id == ProviderId::BedrockServer && !OS_KEYS.contains(&label.as_str()) {
            return Err(ResolveError::InvalidParameter(format!("invalid OS: {label}")));
        }

        set.get(&label)
            .cloned()
            .ok_or_else(|| not_found(id, &label, None))
    }

    /// Pick the requested build, or the newest one. Providers without builds
    /// yield `None` and ignore any requested build.
    async fn select_build(
        &self,
        provider: &RegisteredProvider,
        descriptor: &VersionDescriptor,
        requested: Option<&str>,
    ) -> Result<Option<BuildDescriptor>, ResolveError> {
        let builds = self.builds_of(provider, descriptor).await?;
        let requested = requested.map(str::trim).filter(|b| !b.is_empty());

        if builds.is_empty() {
            if let Some(build) = requested {
                debug!("{} has no builds, ignoring build {}", provider.id(), build);
            }
            return Ok(None);
        }

        match requested {
            None => Ok(builds.first().cloned()),
            Some(requested) => builds
                .iter()
                .find(|build| build.id == requested)
                .cloned()
                .map(Some)
                .ok_or_else(|| not_found(provider.id(), &descriptor.label, Some(requested))),
        }
    }

    async fn download_target(
        &self,
        provider: &RegisteredProvider,
        descriptor: VersionDescriptor,
        build: Option<BuildDescriptor>,
    ) -> Result<DownloadTarget, ResolveError> {
        let id = provider.id();
        let label = descriptor.label.clone();
        let build_id = build.as_ref().map(|b| b.id.clone());
        let request = DownloadRequest {
            version: descriptor,
            build,
        };

        let source = provider.source();
        let (request_ref, label_ref, build_ref) = (&request, &label, build_id.as_deref());
        let fetch = move || async move {
            match source.download_target(request_ref).await {
                Ok(Some(target)) => Ok(target),
                Ok(None) => Err(not_found(id, label_ref, build_ref)),
                Err(e) => {
                    warn!("Failed to resolve download for {} {}: {}", id, label_ref, e);
                    Err(ResolveError::from(e))
                }
            }
        };

        if provider.descriptor().caches_downloads {
            self.cache
                .download((id, label.clone(), build_id.clone()), provider.ttl_ms(), fetch)
                .await
        } else {
            fetch().await
        }
    }

    /// Version labels of a provider in its listing order
    pub async fn list_versions(&self, provider: &str) -> Result<Vec<String>, ResolveError> {
        let provider = self.lookup(provider)?;
        Ok(self.version_set(provider).await?.labels())
    }

    /// Builds of one version, newest first. Empty for providers without a
    /// build concept.
    pub async fn list_builds(
        &self,
        provider: &str,
        version: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let provider = self.lookup(provider)?;
        if version.trim().is_empty() {
            return Err(ResolveError::InvalidParameter("missing version".to_string()));
        }

        let set = self.version_set(provider).await?;
        let descriptor = Self::select_version(provider, &set, Some(version))?;
        let builds = self.builds_of(provider, &descriptor).await?;

        Ok(builds.iter().map(|build| build.id.clone()).collect())
    }

    /// Artifact URL for a version and build; missing values default to the
    /// newest
    pub async fn resolve_download_url(
        &self,
        provider: &str,
        version: Option<&str>,
        build: Option<&str>,
    ) -> Result<String, ResolveError> {
        let provider = self.lookup(provider)?;
        let set = self.version_set(provider).await?;
        let descriptor = Self::select_version(provider, &set, version)?;
        let build = self.select_build(provider, &descriptor, build).await?;

        let target = self.download_target(provider, descriptor, build).await?;
        info!("Resolved {} download to {}", provider.id(), target);

        Ok(target.into_url())
    }

    /// Newest version and build of a provider
    pub async fn resolve_latest(&self, provider: &str) -> Result<LatestRelease, ResolveError> {
        let provider = self.lookup(provider)?;
        let set = self.version_set(provider).await?;
        let descriptor = Self::select_version(provider, &set, None)?;
        let build = self.select_build(provider, &descriptor, None).await?;

        Ok(LatestRelease {
            version: descriptor.label,
            build: build.map(|b| b.id),
        })
    }

    /// Populate the version list of a registered provider; used for warm-up
    pub(crate) async fn prefetch(&self, id: ProviderId) -> Result<usize, ResolveError> {
        let provider = self
            .registry
            .get(&id)
            .ok_or_else(|| ResolveError::InvalidParameter(format!("unknown provider: {id}")))?;
        Ok(self.version_set(provider).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::cache::ManualClock;
    use crate::version::error::SourceError;
    use crate::version::http::HttpClient;
    use crate::version::source::MockVersionSource;
    use crate::version::sources::PaperSource;
    use rstest::rstest;

    const TTL: i64 = 600_000;

    fn service_with(id: ProviderId, source: MockVersionSource) -> ReleaseService {
        let mut registry = ProviderRegistry::new();
        registry.insert(
            id,
            RegisteredProvider::new(id.descriptor(), Arc::new(source), TTL),
        );
        ReleaseService::new(registry, ReleaseCache::with_clock(Arc::new(ManualClock::new(0))))
    }

    fn versions(labels: &[&str]) -> Vec<VersionDescriptor> {
        labels.iter().map(|l| VersionDescriptor::new(*l)).collect()
    }

    #[tokio::test]
    async fn list_versions_sorts_papermc_newest_first() {
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_versions()
            .times(1)
            .returning(|| Ok(versions(&["1.20", "1.20.1", "1.20.2"])));

        let service = service_with(ProviderId::PaperMc, source);

        assert_eq!(
            service.list_versions("papermc").await.unwrap(),
            vec!["1.20.2", "1.20.1", "1.20"]
        );
    }

    #[tokio::test]
    async fn list_versions_keeps_upstream_order_for_fabric() {
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_versions()
            .returning(|| Ok(versions(&["23w43a", "1.20.2", "1.20.1"])));

        let service = service_with(ProviderId::FabricMc, source);

        assert_eq!(
            service.list_versions("fabricmc").await.unwrap(),
            vec!["23w43a", "1.20.2", "1.20.1"]
        );
    }

    #[tokio::test]
    async fn resolve_download_url_builds_papermc_jar_url() {
        let mut server = mockito::Server::new_async().await;
        let base = format!("{}/v2/projects/paper", server.url());
        server
            .mock("GET", "/v2/projects/paper")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"project_id": "paper", "versions": ["1.20.2"]}"#)
            .create_async()
            .await;
        let builds = server
            .mock("GET", "/v2/projects/paper/versions/1.20.2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"version": "1.20.2", "builds": [263, 262]}"#)
            .expect(1)
            .create_async()
            .await;

        let mut registry = ProviderRegistry::new();
        registry.insert(
            ProviderId::PaperMc,
            RegisteredProvider::new(
                ProviderId::PaperMc.descriptor(),
                Arc::new(PaperSource::new(HttpClient::default(), &base, "paper")),
                TTL,
            ),
        );
        let service =
            ReleaseService::new(registry, ReleaseCache::with_clock(Arc::new(ManualClock::new(0))));

        let url = service
            .resolve_download_url("papermc", Some("1.20.2"), Some("263"))
            .await
            .unwrap();

        builds.assert_async().await;
        assert_eq!(
            url,
            format!("{base}/versions/1.20.2/builds/263/downloads/paper-1.20.2-263.jar")
        );
    }

    #[tokio::test]
    async fn resolve_download_url_defaults_to_latest_bungeecord_build() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![
                VersionDescriptor::new("#1764").with_artifact_url("https://ci.md-5.net/job/BungeeCord/1764/artifact/bootstrap/target/BungeeCord.jar"),
                VersionDescriptor::new("#1765").with_artifact_url("https://ci.md-5.net/job/BungeeCord/1765/artifact/bootstrap/target/BungeeCord.jar"),
            ])
        });
        source.expect_fetch_builds().returning(|_| Ok(Vec::new()));
        source
            .expect_download_target()
            .returning(|request| Ok(request.version.artifact_url.clone().map(DownloadTarget::Direct)));

        let service = service_with(ProviderId::BungeeCord, source);
        let url = service
            .resolve_download_url("bungeecord", None, None)
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://ci.md-5.net/job/BungeeCord/1765/artifact/bootstrap/target/BungeeCord.jar"
        );
    }

    #[tokio::test]
    async fn list_builds_twice_fetches_once() {
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_versions()
            .times(1)
            .returning(|| Ok(versions(&["1.20.2"])));
        source
            .expect_fetch_builds()
            .times(1)
            .returning(|_| Ok(vec![BuildDescriptor::from(262), BuildDescriptor::from(263)]));

        let service = service_with(ProviderId::PaperMc, source);
        let first = service.list_builds("papermc", "1.20.2").await.unwrap();
        let second = service.list_builds("papermc", "1.20.2").await.unwrap();

        assert_eq!(first, vec!["263", "262"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_builds_uses_embedded_forge_builds() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![VersionDescriptor::new("1.20.2").with_builds(vec![
                BuildDescriptor::new("48.0.33"),
                BuildDescriptor::new("48.0.34"),
            ])])
        });
        source.expect_fetch_builds().never();

        let service = service_with(ProviderId::Forge, source);

        assert_eq!(
            service.list_builds("forge", "1.20.2").await.unwrap(),
            vec!["48.0.34", "48.0.33"]
        );
    }

    #[tokio::test]
    async fn forge_probe_exhaustion_is_build_not_found() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![VersionDescriptor::new("1.20.2")
                .with_builds(vec![BuildDescriptor::new("48.0.34")])])
        });
        source.expect_download_target().returning(|_| Ok(None));

        let service = service_with(ProviderId::Forge, source);
        let err = service
            .resolve_download_url("forge", Some("1.20.2"), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::BuildNotFound { ref build, .. } if build == "48.0.34"
        ));
    }

    #[tokio::test]
    async fn getbukkit_downloads_are_cached_per_version() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![
                VersionDescriptor::new("1.20.2").with_detail_url("https://getbukkit.org/get/aaa")
            ])
        });
        source.expect_fetch_builds().returning(|_| Ok(Vec::new()));
        source.expect_download_target().times(1).returning(|_| {
            Ok(Some(DownloadTarget::Direct(
                "https://download.getbukkit.org/spigot/spigot-1.20.2.jar".to_string(),
            )))
        });

        let service = service_with(ProviderId::SpigotMc, source);
        for _ in 0..3 {
            assert_eq!(
                service
                    .resolve_download_url("spigotmc", Some("1.20.2"), None)
                    .await
                    .unwrap(),
                "https://download.getbukkit.org/spigot/spigot-1.20.2.jar"
            );
        }
    }

    #[tokio::test]
    async fn resolve_latest_returns_newest_version_and_build() {
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_versions()
            .returning(|| Ok(versions(&["1.20.1", "1.20.2"])));
        source
            .expect_fetch_builds()
            .withf(|version| version == "1.20.2")
            .returning(|_| Ok(vec![BuildDescriptor::new("2062"), BuildDescriptor::new("2095")]));

        let service = service_with(ProviderId::PurpurMc, source);

        assert_eq!(
            service.resolve_latest("purpurmc").await.unwrap(),
            LatestRelease {
                version: "1.20.2".to_string(),
                build: Some("2095".to_string()),
            }
        );
    }

    #[rstest]
    #[case("", None, None)]
    #[case("paper", None, None)]
    #[case("papermc", Some("1.19.4"), None)]
    #[case("papermc", Some("1.20.2"), Some("999"))]
    #[tokio::test]
    async fn resolve_download_url_classifies_bad_input(
        #[case] provider: &str,
        #[case] version: Option<&str>,
        #[case] build: Option<&str>,
    ) {
        let mut source = MockVersionSource::new();
        source
            .expect_fetch_versions()
            .returning(|| Ok(versions(&["1.20.2"])));
        source
            .expect_fetch_builds()
            .returning(|_| Ok(vec![BuildDescriptor::from(263)]));
        source.expect_download_target().never();

        let service = service_with(ProviderId::PaperMc, source);
        let err = service
            .resolve_download_url(provider, version, build)
            .await
            .unwrap_err();

        match (provider, version, build) {
            ("", _, _) | ("paper", _, _) => {
                assert!(matches!(err, ResolveError::InvalidParameter(_)))
            }
            (_, _, Some(_)) => assert!(matches!(err, ResolveError::BuildNotFound { .. })),
            _ => assert!(matches!(err, ResolveError::VersionNotFound { .. })),
        }
    }

    #[tokio::test]
    async fn bedrock_rejects_unknown_os_key() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![VersionDescriptor::new("win").with_artifact_url(
                "https://minecraft.azureedge.net/bin-win/bedrock-server-1.20.41.02.zip",
            )])
        });

        let service = service_with(ProviderId::BedrockServer, source);
        let err = service
            .resolve_download_url("bedrock-server", Some("macos"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn bedrock_defaults_to_windows() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Ok(vec![
                VersionDescriptor::new("linux").with_artifact_url(
                    "https://minecraft.azureedge.net/bin-linux/bedrock-server-1.20.41.02.zip",
                ),
                VersionDescriptor::new("win").with_artifact_url(
                    "https://minecraft.azureedge.net/bin-win/bedrock-server-1.20.41.02.zip",
                ),
            ])
        });
        source.expect_fetch_builds().returning(|_| Ok(Vec::new()));
        source
            .expect_download_target()
            .returning(|request| Ok(request.version.artifact_url.clone().map(DownloadTarget::Direct)));

        let service = service_with(ProviderId::BedrockServer, source);

        assert_eq!(
            service
                .resolve_download_url("bedrock-server", None, None)
                .await
                .unwrap(),
            "https://minecraft.azureedge.net/bin-win/bedrock-server-1.20.41.02.zip"
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_upstream_unavailable() {
        let mut source = MockVersionSource::new();
        source.expect_fetch_versions().returning(|| {
            Err(SourceError::RateLimited {
                retry_after_secs: Some(60),
            })
        });

        let service = service_with(ProviderId::LeavesMc, source);
        let err = service.list_versions("leavesmc").await.unwrap_err();

        assert!(matches!(err, ResolveError::UpstreamUnavailable(_)));
    }

    #[test]
    fn providers_are_listed_in_table_order() {
        let mut registry = ProviderRegistry::new();
        for id in [ProviderId::Rift, ProviderId::PaperMc] {
            registry.insert(
                id,
                RegisteredProvider::new(id.descriptor(), Arc::new(MockVersionSource::new()), TTL),
            );
        }
        let service = ReleaseService::new(registry, ReleaseCache::new());

        assert_eq!(service.providers(), vec![ProviderId::PaperMc, ProviderId::Rift]);
    }
}
