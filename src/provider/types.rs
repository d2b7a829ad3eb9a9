//! Provider identifiers and the static provider table

use crate::config::{DEFAULT_API_TTL_MS, DEFAULT_SCRAPE_TTL_MS, STATIC_TTL_MS};

/// Upstream server-software project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    /// PaperMC (api.papermc.io)
    PaperMc,
    /// Velocity proxy (api.papermc.io)
    Velocity,
    /// Waterfall proxy (api.papermc.io)
    Waterfall,
    /// Travertine proxy (api.papermc.io)
    Travertine,
    /// Purpur (api.purpurmc.org)
    PurpurMc,
    /// Fabric loader (meta.fabricmc.net)
    FabricMc,
    /// Forge (maven-metadata.xml)
    Forge,
    /// BungeeCord (Jenkins Atom feed)
    BungeeCord,
    /// CraftBukkit (getbukkit.org)
    CraftBukkit,
    /// Spigot (getbukkit.org)
    SpigotMc,
    /// Vanilla server jar (getbukkit.org)
    MinecraftServer,
    /// Bedrock Dedicated Server (bedrock.dev)
    BedrockServer,
    /// Leaves (GitHub releases)
    LeavesMc,
    /// Gale (GitHub releases)
    GaleMc,
    /// Rift (archived, fixed release table)
    Rift,
}

impl ProviderId {
    /// Returns the string representation used by callers
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::PaperMc => "papermc",
            ProviderId::Velocity => "velocity",
            ProviderId::Waterfall => "waterfall",
            ProviderId::Travertine => "travertine",
            ProviderId::PurpurMc => "purpurmc",
            ProviderId::FabricMc => "fabricmc",
            ProviderId::Forge => "forge",
            ProviderId::BungeeCord => "bungeecord",
            ProviderId::CraftBukkit => "craftbukkit",
            ProviderId::SpigotMc => "spigotmc",
            ProviderId::MinecraftServer => "minecraft-server",
            ProviderId::BedrockServer => "bedrock-server",
            ProviderId::LeavesMc => "leavesmc",
            ProviderId::GaleMc => "galemc",
            ProviderId::Rift => "rift",
        }
    }

    /// Returns the static descriptor for this provider
    pub fn descriptor(&self) -> &'static Provider {
        PROVIDERS
            .iter()
            .find(|p| p.id == *self)
            .unwrap_or_else(|| unreachable!("every ProviderId has a table entry"))
    }

    /// Normalize a caller-supplied version (or OS key) into the form the
    /// provider's cached version set is keyed by.
    ///
    /// Returns `None` when nothing usable was supplied and the caller should
    /// fall back to the latest version.
    pub fn normalize_version(&self, input: Option<&str>) -> Option<String> {
        let trimmed = input.map(str::trim).filter(|s| !s.is_empty());

        match self {
            // An OS key, not a version. "Windows Preview" -> "win-preview"
            ProviderId::BedrockServer => Some(
                trimmed
                    .map(|s| s.to_lowercase().replace(' ', "-").replace("windows", "win"))
                    .unwrap_or_else(|| "win".to_string()),
            ),
            ProviderId::LeavesMc => trimmed.map(str::to_lowercase),
            ProviderId::GaleMc => trimmed.map(|s| {
                let lower = s.to_lowercase();
                if lower.starts_with('v') {
                    lower
                } else {
                    format!("v{lower}")
                }
            }),
            ProviderId::BungeeCord => trimmed.map(|s| {
                if s.starts_with('#') {
                    s.to_string()
                } else {
                    format!("#{s}")
                }
            }),
            _ => trimmed.map(str::to_string),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "papermc" => Ok(ProviderId::PaperMc),
            "velocity" => Ok(ProviderId::Velocity),
            "waterfall" => Ok(ProviderId::Waterfall),
            "travertine" => Ok(ProviderId::Travertine),
            "purpurmc" => Ok(ProviderId::PurpurMc),
            "fabricmc" => Ok(ProviderId::FabricMc),
            "forge" => Ok(ProviderId::Forge),
            "bungeecord" => Ok(ProviderId::BungeeCord),
            "craftbukkit" => Ok(ProviderId::CraftBukkit),
            "spigotmc" => Ok(ProviderId::SpigotMc),
            "minecraft-server" => Ok(ProviderId::MinecraftServer),
            "bedrock-server" => Ok(ProviderId::BedrockServer),
            "leavesmc" => Ok(ProviderId::LeavesMc),
            "galemc" => Ok(ProviderId::GaleMc),
            "rift" => Ok(ProviderId::Rift),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the upstream a provider is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// REST endpoint returning JSON
    JsonApi,
    /// RSS/Atom feed or maven-metadata.xml
    XmlFeed,
    /// HTML page scraped with CSS selectors
    HtmlScrape,
    /// Fixed table compiled into the binary
    Static,
}

/// How the version labels of a provider are ordered for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// Dotted numeric comparison, newest first
    Descending,
    /// `#1234`-style build numbers, highest first
    BuildNumber,
    /// Keep the order the upstream returned
    Upstream,
}

/// Immutable provider descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub id: ProviderId,
    pub kind: SourceKind,
    /// Default upstream base URL (overridable through configuration)
    pub base_url: &'static str,
    pub order: VersionOrder,
    /// Default cache time-to-live in milliseconds
    pub default_ttl_ms: i64,
    /// Whether resolved download URLs are cached per version. Only set where
    /// resolving a URL costs an extra upstream round trip.
    pub caches_downloads: bool,
}

const fn provider(
    id: ProviderId,
    kind: SourceKind,
    base_url: &'static str,
    order: VersionOrder,
    default_ttl_ms: i64,
) -> Provider {
    Provider {
        id,
        kind,
        base_url,
        order,
        default_ttl_ms,
        caches_downloads: false,
    }
}

const fn scraped(id: ProviderId, base_url: &'static str) -> Provider {
    Provider {
        id,
        kind: SourceKind::HtmlScrape,
        base_url,
        order: VersionOrder::Descending,
        default_ttl_ms: DEFAULT_SCRAPE_TTL_MS,
        caches_downloads: true,
    }
}

/// Every supported provider
pub static PROVIDERS: [Provider; 15] = [
    provider(
        ProviderId::PaperMc,
        SourceKind::JsonApi,
        "https://api.papermc.io/v2/projects/paper",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::Velocity,
        SourceKind::JsonApi,
        "https://api.papermc.io/v2/projects/velocity",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::Waterfall,
        SourceKind::JsonApi,
        "https://api.papermc.io/v2/projects/waterfall",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::Travertine,
        SourceKind::JsonApi,
        "https://api.papermc.io/v2/projects/travertine",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::PurpurMc,
        SourceKind::JsonApi,
        "https://api.purpurmc.org/v2/purpur",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    // Game versions include snapshot ids ("23w44a") the numeric comparator
    // cannot order; meta.fabricmc.net lists newest first.
    provider(
        ProviderId::FabricMc,
        SourceKind::JsonApi,
        "https://meta.fabricmc.net/v2",
        VersionOrder::Upstream,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::Forge,
        SourceKind::XmlFeed,
        "https://files.minecraftforge.net/maven/net/minecraftforge/forge",
        VersionOrder::Descending,
        DEFAULT_API_TTL_MS,
    ),
    provider(
        ProviderId::BungeeCord,
        SourceKind::XmlFeed,
        "https://ci.md-5.net/job/BungeeCord",
        VersionOrder::BuildNumber,
        DEFAULT_API_TTL_MS,
    ),
    scraped(
        ProviderId::CraftBukkit,
        "https://getbukkit.org/download/craftbukkit",
    ),
    scraped(ProviderId::SpigotMc, "https://getbukkit.org/download/spigot"),
    scraped(
        ProviderId::MinecraftServer,
        "https://getbukkit.org/download/vanilla",
    ),
    Provider {
        id: ProviderId::BedrockServer,
        kind: SourceKind::HtmlScrape,
        base_url: "https://bedrock.dev",
        order: VersionOrder::Upstream,
        default_ttl_ms: DEFAULT_SCRAPE_TTL_MS,
        caches_downloads: false,
    },
    provider(
        ProviderId::LeavesMc,
        SourceKind::JsonApi,
        "https://api.github.com/repos/LeavesMC/Leaves/releases",
        VersionOrder::Upstream,
        DEFAULT_SCRAPE_TTL_MS,
    ),
    provider(
        ProviderId::GaleMc,
        SourceKind::JsonApi,
        "https://api.github.com/repos/GaleMC/Gale/releases",
        VersionOrder::Upstream,
        DEFAULT_SCRAPE_TTL_MS,
    ),
    provider(
        ProviderId::Rift,
        SourceKind::Static,
        "https://mediafilez.forgecdn.net/files",
        VersionOrder::Upstream,
        STATIC_TTL_MS,
    ),
];
