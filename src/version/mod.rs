//! Release resolution layer
//!
//! This module provides the core functionality for fetching, caching and
//! ordering server-software releases from heterogeneous upstreams (JSON APIs,
//! XML feeds, scraped HTML pages).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│    Cache    │◀────│   Service   │
//! │  (fetch)    │     │ (TTL, once) │     │  (resolve)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │   Sources   │                         │   Compare   │
//! │(paper,forge)│                         │(version cmp)│
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: In-memory TTL cache with single-flight refresh
//! - [`compare`]: Dotted numeric version ordering
//! - [`source`]: Source trait for reading releases from an upstream
//! - [`sources`]: Concrete source implementations (PaperMC, Forge, ...)
//! - [`forge`]: Candidate probing for Forge artifacts
//! - [`http`]: Shared HTTP client
//! - [`error`]: Error types for sources and resolution
//! - [`types`]: Version, build and download descriptors

pub mod cache;
pub mod compare;
pub mod error;
pub mod forge;
pub mod http;
pub mod source;
pub mod sources;
pub mod types;
