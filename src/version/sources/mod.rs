//! Upstream source implementations, one per upstream shape
//!
//! | source | kind | providers |
//! |---|---|---|
//! | [`PaperSource`] | JSON API | papermc, velocity, waterfall, travertine |
//! | [`PurpurSource`] | JSON API | purpurmc |
//! | [`FabricSource`] | JSON API | fabricmc |
//! | [`GitHubReleasesSource`] | JSON API | leavesmc, galemc |
//! | [`BungeeCordSource`] | XML feed | bungeecord |
//! | [`ForgeSource`] | XML feed | forge |
//! | [`GetBukkitSource`] | HTML scrape | craftbukkit, spigotmc, minecraft-server |
//! | [`BedrockSource`] | HTML scrape | bedrock-server |
//! | [`RiftSource`] | static | rift |

pub mod bedrock;
pub mod bungeecord;
pub mod fabric;
pub mod forge;
pub mod getbukkit;
pub mod github;
pub mod paper;
pub mod purpur;
pub mod rift;

pub use bedrock::BedrockSource;
pub use bungeecord::BungeeCordSource;
pub use fabric::FabricSource;
pub use forge::ForgeSource;
pub use getbukkit::GetBukkitSource;
pub use github::GitHubReleasesSource;
pub use paper::PaperSource;
pub use purpur::PurpurSource;
pub use rift::RiftSource;

use serde::Deserialize;

use crate::version::error::SourceError;
use crate::version::types::BuildDescriptor;

/// Build number as found in upstream JSON: some APIs use numbers, others
/// numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBuild {
    Number(u64),
    Text(String),
}

impl From<RawBuild> for BuildDescriptor {
    fn from(raw: RawBuild) -> Self {
        match raw {
            RawBuild::Number(n) => BuildDescriptor::from(n),
            RawBuild::Text(s) => BuildDescriptor::new(s),
        }
    }
}

/// Resolve a possibly relative link against the page it was found on
fn absolute_url(page_url: &str, href: &str) -> Result<String, SourceError> {
    let base = url::Url::parse(page_url)
        .map_err(|e| SourceError::ShapeChanged(format!("invalid page url {page_url}: {e}")))?;
    base.join(href.trim())
        .map(String::from)
        .map_err(|e| SourceError::ShapeChanged(format!("invalid link {href}: {e}")))
}
