use anyhow::Context;
use clap::Parser;
use questlog_api::ReportClient;
use questlog_cache::SqliteStore;
use questlog_core::{
    CatalogLocation, Config, FilterMode, ProgressTracker, SortOrder, TraderFilter,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "questlog")]
#[command(version, about = "Terminal quest tracker: what's done, what's unlocked, what's left", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "QUESTLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog URL or path, overrides catalog.source
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Progress database, overrides storage.db_path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive tracker (default)
    Tui,
    /// Print the quest list for a set of filters
    List {
        /// Case-insensitive substring of the quest name
        #[arg(long, default_value = "")]
        search: String,

        /// Trader name, or "All"
        #[arg(long, default_value = "All")]
        trader: String,

        /// active, kappa, lightkeeper or all
        #[arg(long)]
        mode: Option<FilterMode>,

        /// catalog or priority
        #[arg(long)]
        order: Option<SortOrder>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Completion percentages and per-trader breakdown
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Mark a quest done, or undo it (id or exact name)
    Toggle { quest: String },
    /// Mark a collector item found, or undo it
    Find { item: String },
    /// Wipe all quest and stash progress
    Reset {
        /// Required, there's no undo
        #[arg(long)]
        yes: bool,
    },
    /// Send a bug report to the configured webhook
    Report { text: String },
}

fn init_logging(log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "questlog=info".into());

    match log_file {
        // The TUI owns the terminal, so its logs go to a file
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Flags win over the file
    if let Some(catalog) = &cli.catalog {
        config.catalog.source = catalog.clone();
    }
    if let Some(db) = &cli.db {
        config.storage.db_path = Some(db.clone());
    }

    Ok(config)
}

fn open_tracker(config: &Config) -> anyhow::Result<ProgressTracker> {
    let db_path = config.storage.resolved_db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::new(&db_path)
        .with_context(|| format!("Failed to open progress database {}", db_path.display()))?;
    Ok(ProgressTracker::load(Box::new(store)))
}

fn report_client(config: &Config) -> anyhow::Result<Option<ReportClient>> {
    match &config.report.webhook_url {
        Some(url) => Ok(Some(ReportClient::new(
            url.clone(),
            config.report.mention.clone(),
        )?)),
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Tui);

    let log_file = match command {
        Commands::Tui => Some(Config::data_dir()?.join("questlog.log")),
        _ => None,
    };
    init_logging(log_file)?;

    let config = load_config(&cli)?;
    tracing::debug!("Catalog source: {}", config.catalog.source);

    match command {
        Commands::Tui => {
            let tracker = open_tracker(&config)?;
            let source =
                CatalogLocation::parse(&config.catalog.source).into_source(config.catalog_timeout())?;
            let app = questlog_tui::App::new(tracker, &config);
            questlog_tui::run_tui(app, source, config.catalog_timeout(), report_client(&config)?)
                .await?;
        }
        Commands::List {
            search,
            trader,
            mode,
            order,
            json,
        } => {
            let session = commands::Session::open(&config, open_tracker(&config)?).await?;
            let mut criteria = session.default_criteria();
            criteria.search = search;
            criteria.trader = TraderFilter::from(trader.as_str());
            if let Some(mode) = mode {
                criteria.mode = mode;
            }
            if let Some(order) = order {
                criteria.order = order;
            }
            commands::list(&session, &criteria, json)?;
        }
        Commands::Stats { json } => {
            let session = commands::Session::open(&config, open_tracker(&config)?).await?;
            commands::stats(&session, json)?;
        }
        Commands::Toggle { quest } => {
            let mut session = commands::Session::open(&config, open_tracker(&config)?).await?;
            commands::toggle(&mut session, &quest)?;
        }
        Commands::Find { item } => {
            let mut session = commands::Session::open(&config, open_tracker(&config)?).await?;
            commands::find(&mut session, &item)?;
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to wipe progress without --yes");
            }
            let mut tracker = open_tracker(&config)?;
            tracker.reset_all()?;
            println!("Progress wiped");
        }
        Commands::Report { text } => {
            let client = report_client(&config)?
                .context("No report.webhook_url configured")?;
            client.send(&text).await?;
            println!("Report sent");
        }
    }

    Ok(())
}
