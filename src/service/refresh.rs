//! Cache warm-up for provider version lists

use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::provider::ProviderId;
use crate::service::release::ReleaseService;

/// Outcome of warming one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub provider: ProviderId,
    /// Number of cached versions, or the error message
    pub result: Result<usize, String>,
}

/// Fetch the version list of each provider into the cache
///
/// Errors are logged but do not stop processing of other providers.
/// Fetches are executed in parallel with staggered start times to avoid rate
/// limiting.
pub async fn refresh_providers(
    service: &ReleaseService,
    providers: Vec<ProviderId>,
) -> Vec<RefreshOutcome> {
    let futures = providers.into_iter().enumerate().map(|(i, provider)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            let result = service
                .prefetch(provider)
                .await
                .inspect(|count| info!("Warmed {} with {} versions", provider, count))
                .inspect_err(|e| error!("Failed to warm {}: {}", provider, e))
                .map_err(|e| e.to_string());
            RefreshOutcome { provider, result }
        }
    });

    join_all(futures).await
}

/// Warm every registered provider
pub async fn refresh_all(service: &ReleaseService) -> Vec<RefreshOutcome> {
    refresh_providers(service, service.providers()).await
}
