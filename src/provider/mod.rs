//! Provider descriptors
//!
//! A provider is one upstream server-software project. Descriptors are static
//! data; the behaviour for each provider lives in its
//! [`VersionSource`](crate::version::source::VersionSource) implementation.

pub mod types;

pub use types::{PROVIDERS, Provider, ProviderId, SourceKind, VersionOrder};
