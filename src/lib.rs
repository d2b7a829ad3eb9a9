//! Release resolution for Minecraft server software.
//!
//! Lists versions and builds for fifteen upstream projects (PaperMC, Purpur,
//! Forge, Fabric, BungeeCord, getbukkit mirrors, Bedrock and others) and
//! resolves concrete artifact download URLs, caching upstream responses with
//! a per-provider time-to-live.
//!
//! - [`provider`]: static provider table and identifiers
//! - [`version`]: comparator, cache, upstream sources and Forge probing
//! - [`service`]: the [`service::ReleaseService`] facade and provider registry
//! - [`config`]: configuration file and constants

pub mod config;
pub mod provider;
pub mod service;
pub mod version;
