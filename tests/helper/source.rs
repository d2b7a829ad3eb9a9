//! Source test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use mcrelease::provider::ProviderId;
use mcrelease::service::{ProviderRegistry, RegisteredProvider, ReleaseService};
use mcrelease::version::cache::{ManualClock, ReleaseCache};
use mcrelease::version::error::SourceError;
use mcrelease::version::source::VersionSource;
use mcrelease::version::types::{
    BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor,
};

/// Source serving fixed data and counting upstream calls
#[derive(Default)]
pub struct StaticSource {
    versions: Vec<VersionDescriptor>,
    builds: HashMap<String, Vec<BuildDescriptor>>,
    version_calls: Arc<AtomicUsize>,
    build_calls: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, labels: Vec<&str>) -> Self {
        self.versions = labels.into_iter().map(VersionDescriptor::new).collect();
        self
    }

    pub fn with_builds(mut self, version: &str, builds: Vec<&str>) -> Self {
        self.builds.insert(
            version.to_string(),
            builds.into_iter().map(BuildDescriptor::new).collect(),
        );
        self
    }

    /// Counter of `fetch_versions` calls, shared with the source
    pub fn version_calls(&self) -> Arc<AtomicUsize> {
        self.version_calls.clone()
    }

    /// Counter of `fetch_builds` calls, shared with the source
    pub fn build_calls(&self) -> Arc<AtomicUsize> {
        self.build_calls.clone()
    }
}

#[async_trait]
impl VersionSource for StaticSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.versions.clone())
    }

    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.builds.get(version).cloned().unwrap_or_default())
    }

    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError> {
        Ok(request.build.as_ref().map(|build| {
            DownloadTarget::Direct(format!(
                "https://example.invalid/{}/{}.jar",
                request.version.label, build
            ))
        }))
    }
}

/// Create a service with a single provider backed by `source` and a manual
/// clock starting at zero
pub fn create_test_service(
    id: ProviderId,
    source: StaticSource,
    ttl_ms: i64,
) -> (Arc<ManualClock>, ReleaseService) {
    let clock = Arc::new(ManualClock::new(0));
    let mut registry = ProviderRegistry::new();
    registry.insert(
        id,
        RegisteredProvider::new(id.descriptor(), Arc::new(source), ttl_ms),
    );
    let service = ReleaseService::new(registry, ReleaseCache::with_clock(clock.clone()));
    (clock, service)
}
