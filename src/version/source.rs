//! Source trait for reading versions, builds and artifacts from an upstream

#[cfg(test)]
use mockall::automock;

use crate::version::error::SourceError;
use crate::version::types::{BuildDescriptor, DownloadRequest, DownloadTarget, VersionDescriptor};

/// Trait for reading one provider's releases from its upstream
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetches every version the upstream publishes
    ///
    /// # Returns
    /// * `Ok(Vec<VersionDescriptor>)` - Versions in upstream order; callers
    ///   re-sort according to the provider's listing policy
    /// * `Err(SourceError)` - If the upstream is unreachable or its response
    ///   no longer has the expected shape
    async fn fetch_versions(&self) -> Result<Vec<VersionDescriptor>, SourceError>;

    /// Fetches the builds of one version
    ///
    /// Only called for versions whose descriptor carries no embedded builds.
    /// Providers without a build concept return an empty list.
    async fn fetch_builds(&self, version: &str) -> Result<Vec<BuildDescriptor>, SourceError>;

    /// Locates the artifact for a version and optional build
    ///
    /// # Returns
    /// * `Ok(Some(DownloadTarget))` - The artifact location
    /// * `Ok(None)` - The upstream has no artifact for this version/build
    /// * `Err(SourceError)` - If the lookup itself failed
    async fn download_target(
        &self,
        request: &DownloadRequest,
    ) -> Result<Option<DownloadTarget>, SourceError>;
}
