#![allow(dead_code)]

pub mod source;

pub use source::{StaticSource, create_test_service};

use mcrelease::config::{ProviderConfig, ResolverConfig};

/// Configuration pointing one provider at a mock server
pub fn config_with_base_url(provider: &str, base_url: &str) -> ResolverConfig {
    let mut config = ResolverConfig::default();
    config.providers.insert(
        provider.to_string(),
        ProviderConfig {
            base_url: Some(base_url.to_string()),
            ..Default::default()
        },
    );
    config
}
