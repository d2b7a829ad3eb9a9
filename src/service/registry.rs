//! Provider registry: which source serves which provider
//!
//! Groups the static provider descriptor, its configured time-to-live and the
//! source that reads its upstream.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{BROWSER_USER_AGENT, ResolverConfig};
use crate::provider::{PROVIDERS, Provider, ProviderId, SourceKind};
use crate::version::http::HttpClient;
use crate::version::source::VersionSource;
use crate::version::sources::{
    BedrockSource, BungeeCordSource, FabricSource, ForgeSource, GetBukkitSource,
    GitHubReleasesSource, PaperSource, PurpurSource, RiftSource,
};

/// A provider wired to its upstream source
#[derive(Clone)]
pub struct RegisteredProvider {
    descriptor: &'static Provider,
    source: Arc<dyn VersionSource>,
    ttl_ms: i64,
}

impl RegisteredProvider {
    pub fn new(descriptor: &'static Provider, source: Arc<dyn VersionSource>, ttl_ms: i64) -> Self {
        Self {
            descriptor,
            source,
            ttl_ms,
        }
    }

    pub fn descriptor(&self) -> &'static Provider {
        self.descriptor
    }

    pub fn id(&self) -> ProviderId {
        self.descriptor.id
    }

    pub fn source(&self) -> &Arc<dyn VersionSource> {
        &self.source
    }

    /// Effective time-to-live for every cache entry of this provider
    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }
}

/// Provider registry keyed by id
pub type ProviderRegistry = HashMap<ProviderId, RegisteredProvider>;

/// Project name in the PaperMC downloads API
fn paper_project(id: ProviderId) -> &'static str {
    match id {
        ProviderId::PaperMc => "paper",
        other => other.as_str(),
    }
}

/// Scraped pages get the browser client; getbukkit.org rejects other agents
fn client_for<'a>(kind: SourceKind, api: &'a HttpClient, browser: &'a HttpClient) -> &'a HttpClient {
    match kind {
        SourceKind::HtmlScrape => browser,
        SourceKind::JsonApi | SourceKind::XmlFeed | SourceKind::Static => api,
    }
}

fn create_source(
    provider: &Provider,
    base_url: &str,
    api: &HttpClient,
    browser: &HttpClient,
) -> Arc<dyn VersionSource> {
    let client = client_for(provider.kind, api, browser).clone();

    match provider.id {
        ProviderId::PaperMc
        | ProviderId::Velocity
        | ProviderId::Waterfall
        | ProviderId::Travertine => {
            Arc::new(PaperSource::new(client, base_url, paper_project(provider.id)))
        }
        ProviderId::PurpurMc => Arc::new(PurpurSource::new(client, base_url)),
        ProviderId::FabricMc => Arc::new(FabricSource::new(client, base_url)),
        ProviderId::Forge => Arc::new(ForgeSource::new(client, base_url)),
        ProviderId::BungeeCord => Arc::new(BungeeCordSource::new(client, base_url)),
        ProviderId::CraftBukkit | ProviderId::SpigotMc | ProviderId::MinecraftServer => {
            Arc::new(GetBukkitSource::new(client, base_url))
        }
        ProviderId::BedrockServer => Arc::new(BedrockSource::new(client, base_url)),
        ProviderId::LeavesMc | ProviderId::GaleMc => {
            Arc::new(GitHubReleasesSource::new(client, base_url))
        }
        ProviderId::Rift => Arc::new(RiftSource::new(base_url)),
    }
}

/// Create the registry of every enabled provider
pub fn create_default_registry(config: &ResolverConfig) -> ProviderRegistry {
    let api = HttpClient::from_config(&config.http);
    let browser = HttpClient::new(
        BROWSER_USER_AGENT,
        Duration::from_millis(config.http.timeout_ms),
    );

    PROVIDERS
        .iter()
        .filter(|provider| {
            let enabled = config.is_enabled(provider.id);
            if !enabled {
                debug!("Provider {} disabled by configuration", provider.id);
            }
            enabled
        })
        .map(|provider| {
            let source = create_source(provider, &config.base_url(provider.id), &api, &browser);
            (
                provider.id,
                RegisteredProvider::new(provider, source, config.ttl_ms(provider.id)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_API_TTL_MS, DEFAULT_USER_AGENT, ProviderConfig};
    use mockito::{Matcher, Server};

    #[test]
    fn default_registry_contains_every_provider() {
        let registry = create_default_registry(&ResolverConfig::default());

        assert_eq!(registry.len(), PROVIDERS.len());
        for provider in &PROVIDERS {
            let registered = &registry[&provider.id];
            assert_eq!(registered.id(), provider.id);
            assert_eq!(registered.ttl_ms(), provider.default_ttl_ms);
        }
    }

    #[test]
    fn disabled_providers_are_not_registered() {
        let mut config = ResolverConfig::default();
        config.providers.insert(
            "forge".to_string(),
            ProviderConfig {
                enabled: false,
                ..Default::default()
            },
        );

        let registry = create_default_registry(&config);

        assert!(!registry.contains_key(&ProviderId::Forge));
        assert!(registry.contains_key(&ProviderId::PaperMc));
    }

    #[test]
    fn configured_ttl_overrides_default() {
        let mut config = ResolverConfig::default();
        config.providers.insert(
            "papermc".to_string(),
            ProviderConfig {
                ttl_ms: Some(5_000),
                ..Default::default()
            },
        );

        let registry = create_default_registry(&config);

        assert_eq!(registry[&ProviderId::PaperMc].ttl_ms(), 5_000);
        assert_eq!(registry[&ProviderId::Velocity].ttl_ms(), DEFAULT_API_TTL_MS);
    }

    #[test]
    fn paper_family_uses_api_project_names() {
        assert_eq!(paper_project(ProviderId::PaperMc), "paper");
        assert_eq!(paper_project(ProviderId::Travertine), "travertine");
    }

    #[tokio::test]
    async fn scraped_providers_send_browser_user_agent() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/bedrock")
            .match_header("user-agent", Matcher::Exact(BROWSER_USER_AGENT.to_string()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<select id="tag"><option value="stable">1.20.41.2</option></select>"#)
            .expect(1)
            .create_async()
            .await;
        let api = server
            .mock("GET", "/purpur")
            .match_header("user-agent", Matcher::Exact(DEFAULT_USER_AGENT.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"project": "purpur", "versions": ["1.20.2"]}"#)
            .expect(1)
            .create_async()
            .await;

        let mut config = ResolverConfig::default();
        for (name, path) in [("bedrock-server", "/bedrock"), ("purpurmc", "/purpur")] {
            config.providers.insert(
                name.to_string(),
                ProviderConfig {
                    base_url: Some(format!("{}{}", server.url(), path)),
                    ..Default::default()
                },
            );
        }
        let registry = create_default_registry(&config);

        registry[&ProviderId::BedrockServer]
            .source()
            .fetch_versions()
            .await
            .unwrap();
        registry[&ProviderId::PurpurMc]
            .source()
            .fetch_versions()
            .await
            .unwrap();

        page.assert_async().await;
        api.assert_async().await;
    }
}
