//! Resolution facade over the provider registry
//!
//! - [`registry`]: which source serves which provider
//! - [`release`]: [`ReleaseService`], the list/resolve operations
//! - [`refresh`]: cache warm-up

pub mod refresh;
pub mod registry;
pub mod release;

pub use registry::{ProviderRegistry, RegisteredProvider, create_default_registry};
pub use release::{LatestRelease, ReleaseService};
