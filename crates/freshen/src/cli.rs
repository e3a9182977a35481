use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use freshen_cache::{Cacher, Refresh, UpdatePeriodTable, requires_update};
use freshen_fetch::{BackendCapability, DownloadManager, TransportConfig, normalize_proxy};
use freshen_notify::Notifier;
use tracing::info;

use crate::dirs::config_dir;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "freshen", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding settings.json.
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download a URL unless the cached copy is still fresh.
    #[command(alias = "f")]
    Fetch(FetchArg),
    /// Tell whether a cached file needs refreshing.
    #[command(alias = "c")]
    Check(CheckArg),
    /// List the transport backends in this build.
    Backends,
    /// Print the normalized form of a proxy string.
    Proxy(ProxyArg),
}

#[derive(Debug, Clone, Args)]
pub struct FetchArg {
    pub url: String,
    pub dest: PathBuf,
    /// Update-period table position (0 = never, 1 = always, 2 = hourly, ...).
    #[arg(long, short)]
    pub period: Option<usize>,
    #[arg(long)]
    pub proxy: Option<String>,
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Download even if the cached copy is fresh.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArg {
    pub path: PathBuf,
    #[arg(long, short)]
    pub period: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct ProxyArg {
    pub raw: String,
}

impl App {
    pub async fn run(self) -> Result<()> {
        let notifier = Notifier::default();
        match self.cmd {
            Commands::Fetch(arg) => {
                let settings = load_settings(self.config_dir, &notifier)?;
                fetch(arg, &settings, notifier).await
            }
            Commands::Check(arg) => {
                let settings = load_settings(self.config_dir, &notifier)?;
                check(&arg, &settings, &notifier);
                Ok(())
            }
            Commands::Backends => {
                backends(&notifier);
                Ok(())
            }
            Commands::Proxy(arg) => {
                println!("{}", normalize_proxy(Some(&arg.raw)).unwrap_or_else(|| "(none)".into()));
                Ok(())
            }
        }
    }
}

fn load_settings(over: Option<PathBuf>, notifier: &Notifier) -> Result<Settings> {
    let dir = config_dir(over)?;
    let file = Settings::open(&dir, notifier.clone())?;
    Ok(file.get().clone())
}

async fn fetch(arg: FetchArg, settings: &Settings, notifier: Notifier) -> Result<()> {
    let settings = settings.overridden(arg.period, arg.proxy, arg.user_agent);
    let config = TransportConfig::new()
        .with_proxy(settings.proxy.as_deref())
        .with_user_agent(settings.user_agent.as_deref());
    let cacher = Cacher::new(DownloadManager::new(config, notifier), settings.update_period);

    let outcome = if arg.force {
        if cacher.downloads().download_save(&arg.url, &arg.dest).await {
            Refresh::Updated
        } else {
            Refresh::Failed
        }
    } else {
        cacher.refresh(&arg.url, &arg.dest).await
    };

    match outcome {
        Refresh::Fresh => println!("fresh: {} ({})", arg.dest.display(), cacher.policy()),
        Refresh::Updated => {
            info!(url = %arg.url, "downloaded");
            println!("updated: {}", arg.dest.display());
        }
        Refresh::Failed => bail!("could not download {}", arg.url),
    }
    Ok(())
}

fn check(arg: &CheckArg, settings: &Settings, notifier: &Notifier) {
    let table = UpdatePeriodTable::default();
    let period = arg.period.unwrap_or(settings.update_period);
    let policy = table.resolve(period.into(), notifier);

    let state = if requires_update(&arg.path, policy) {
        "stale"
    } else {
        "fresh"
    };
    println!("{state}: {} ({policy})", arg.path.display());
}

fn backends(notifier: &Notifier) {
    let chain = freshen_fetch::TransportChain::probe(&TransportConfig::new(), notifier);
    let usable = chain.capabilities();
    for capability in BackendCapability::ALL {
        let status = if usable.contains(&capability) {
            "available"
        } else if capability.available() {
            "failed to initialize"
        } else {
            "not compiled in"
        };
        println!("{:<10} {status}", capability.name());
    }
}
