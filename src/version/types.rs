//! Version, build and download descriptors shared by sources and the cache

use indexmap::IndexMap;
use serde::Serialize;

/// A provider-specific build identifier ("263", "48.0.34", "0.15.3")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildDescriptor {
    pub id: String,
}

impl BuildDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<u64> for BuildDescriptor {
    fn from(number: u64) -> Self {
        Self::new(number.to_string())
    }
}

impl std::fmt::Display for BuildDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// One upstream version as returned by a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    /// Version label used as the lookup key
    pub label: String,
    /// Builds known at version-fetch time (e.g. Forge, where the metadata
    /// document carries them). `None` means builds are fetched separately or
    /// the provider has no build concept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builds: Option<Vec<BuildDescriptor>>,
    /// Direct artifact URL when the version alone identifies the download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    /// Intermediate page that must be fetched to find the artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

impl VersionDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_builds(mut self, builds: Vec<BuildDescriptor>) -> Self {
        self.builds = Some(builds);
        self
    }

    pub fn with_artifact_url(mut self, url: impl Into<String>) -> Self {
        self.artifact_url = Some(url.into());
        self
    }

    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.detail_url = Some(url.into());
        self
    }
}

/// The cached version list of one provider, in listing order, keyed by label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet {
    versions: IndexMap<String, VersionDescriptor>,
}

impl VersionSet {
    /// Build a set from already-ordered descriptors. A repeated label keeps
    /// its first position and descriptor.
    pub fn new(descriptors: Vec<VersionDescriptor>) -> Self {
        let mut versions = IndexMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            versions
                .entry(descriptor.label.clone())
                .or_insert(descriptor);
        }
        Self { versions }
    }

    pub fn get(&self, label: &str) -> Option<&VersionDescriptor> {
        self.versions.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.versions.contains_key(label)
    }

    /// First entry in listing order
    pub fn latest(&self) -> Option<&VersionDescriptor> {
        self.versions.first().map(|(_, v)| v)
    }

    pub fn labels(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionDescriptor> {
        self.versions.values()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Arguments for resolving the artifact of a version/build pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub version: VersionDescriptor,
    pub build: Option<BuildDescriptor>,
}

/// Resolved artifact location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// URL built from a known template or read from the upstream
    Direct(String),
    /// URL found by probing candidate locations
    Probed(String),
}

impl DownloadTarget {
    pub fn url(&self) -> &str {
        match self {
            DownloadTarget::Direct(url) | DownloadTarget::Probed(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            DownloadTarget::Direct(url) | DownloadTarget::Probed(url) => url,
        }
    }
}

impl std::fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_set_keeps_order_and_first_duplicate() {
        let set = VersionSet::new(vec![
            VersionDescriptor::new("1.20.2").with_artifact_url("first"),
            VersionDescriptor::new("1.20.1"),
            VersionDescriptor::new("1.20.2").with_artifact_url("second"),
        ]);

        assert_eq!(set.labels(), vec!["1.20.2", "1.20.1"]);
        assert_eq!(
            set.get("1.20.2").and_then(|v| v.artifact_url.as_deref()),
            Some("first")
        );
        assert_eq!(set.latest().map(|v| v.label.as_str()), Some("1.20.2"));
    }

    #[test]
    fn empty_version_set_has_no_latest() {
        let set = VersionSet::default();

        assert!(set.is_empty());
        assert_eq!(set.latest(), None);
    }
}
