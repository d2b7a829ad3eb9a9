use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use mcrelease::config::{ResolverConfig, data_dir};
use mcrelease::provider::ProviderId;
use mcrelease::service::ReleaseService;
use mcrelease::service::refresh::{refresh_all, refresh_providers};

#[derive(Parser)]
#[command(name = "mcrelease")]
#[command(version, about = "Resolve versions, builds and download URLs of Minecraft server software")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/mcrelease/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily file in the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List supported providers
    Providers,
    /// List the versions of a provider, newest first
    Versions { provider: String },
    /// List the builds of one version, newest first
    Builds { provider: String, version: String },
    /// Resolve the download URL of a version and build (latest by default)
    Download {
        provider: String,
        version: Option<String>,
        #[arg(long)]
        build: Option<String>,
    },
    /// Show the newest version and build
    Latest { provider: String },
    /// Fetch version lists into the cache and report what was found
    Refresh { providers: Vec<String> },
}

fn init_tracing(log_file: bool, log_json: bool) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = if log_file {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("mcrelease.log")
            .build(data_dir())
            .context("Failed to open log file")?;
        tracing_appender::non_blocking(appender)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!log_file);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(guard)
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn parse_provider(name: &str) -> anyhow::Result<ProviderId> {
    name.parse()
        .map_err(|_| anyhow!("unknown provider: {name}"))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ResolverConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let service = ReleaseService::from_config(&config);
    let json = cli.json;

    match cli.command {
        Command::Providers => {
            let providers: Vec<&str> = service.providers().iter().map(|p| p.as_str()).collect();
            print(json, &providers, || providers.join("\n"))
        }
        Command::Versions { provider } => {
            let versions = service.list_versions(&provider).await?;
            print(json, &versions, || versions.join("\n"))
        }
        Command::Builds { provider, version } => {
            let builds = service.list_builds(&provider, &version).await?;
            print(json, &builds, || builds.join("\n"))
        }
        Command::Download {
            provider,
            version,
            build,
        } => {
            let url = service
                .resolve_download_url(&provider, version.as_deref(), build.as_deref())
                .await?;
            print(json, &url, || url.clone())
        }
        Command::Latest { provider } => {
            let latest = service.resolve_latest(&provider).await?;
            print(json, &latest, || match &latest.build {
                Some(build) => format!("{} {}", latest.version, build),
                None => latest.version.clone(),
            })
        }
        Command::Refresh { providers } => {
            let outcomes = if providers.is_empty() {
                refresh_all(&service).await
            } else {
                let ids = providers
                    .iter()
                    .map(String::as_str)
                    .map(parse_provider)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                refresh_providers(&service, ids).await
            };

            let report: Vec<serde_json::Value> = outcomes
                .iter()
                .map(|outcome| match &outcome.result {
                    Ok(count) => serde_json::json!({
                        "provider": outcome.provider.as_str(),
                        "versions": count,
                    }),
                    Err(e) => serde_json::json!({
                        "provider": outcome.provider.as_str(),
                        "error": e,
                    }),
                })
                .collect();
            print(json, &report, || {
                outcomes
                    .iter()
                    .map(|outcome| match &outcome.result {
                        Ok(count) => format!("{}: {} versions", outcome.provider, count),
                        Err(e) => format!("{}: {}", outcome.provider, e),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file, cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
        .inspect_err(|e| tracing::error!("{:#}", e))
}
