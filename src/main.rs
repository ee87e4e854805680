//! Profile-Harvest main entry point
//!
//! This is the command-line interface for the Profile-Harvest search harvester.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use profile_harvest::config::{load_config_with_hash, Config};
use profile_harvest::coordinator::{Coordinator, Message, Reporter};
use profile_harvest::crawler::HttpPageSource;
use profile_harvest::output::{load_statistics, print_statistics, write_export};
use profile_harvest::state::FetchPhase;
use profile_harvest::storage::{open_store, StateStore};
use profile_harvest::url::{base_url, normalize_search_url};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::EnvFilter;

/// Profile-Harvest: a resumable GitHub user search harvester
///
/// Profile-Harvest walks every page of a user search, fetches the public
/// profile of each user found, and exports the profiles as a dated CSV file.
/// An interrupted crawl resumes at the page it stopped on.
#[derive(Parser, Debug)]
#[command(name = "profile-harvest")]
#[command(version)]
#[command(about = "A resumable GitHub user search harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Search URL to harvest (overrides [search] url in the config)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted crawl of the same search (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start the crawl from page 1, discarding saved progress
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Only scrape the page the URL points at
    #[arg(long)]
    single_page: bool,

    /// Scrape usernames and stop before fetching profiles
    #[arg(long, conflicts_with_all = ["fetch_only", "export_only", "status", "dry_run"])]
    crawl_only: bool,

    /// Fetch profiles for the usernames of the last scrape, then export
    #[arg(long, conflicts_with_all = ["crawl_only", "export_only", "status", "dry_run"])]
    fetch_only: bool,

    /// Export the profiles of the last fetch and exit
    #[arg(long, conflicts_with_all = ["crawl_only", "fetch_only", "status", "dry_run"])]
    export_only: bool,

    /// Show what the database holds and exit
    #[arg(long, conflicts_with_all = ["crawl_only", "fetch_only", "export_only", "dry_run"])]
    status: bool,

    /// Validate config and show what would be harvested without doing it
    #[arg(long, conflicts_with_all = ["crawl_only", "fetch_only", "export_only", "status"])]
    dry_run: bool,
}

/// Stages a harvest run goes through
#[derive(Debug, Clone, Copy)]
struct Stages {
    crawl: bool,
    fetch: bool,
    export: bool,
}

impl Stages {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            crawl: !cli.fetch_only,
            fetch: !cli.crawl_only,
            export: !cli.crawl_only,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let search_url = cli
        .url
        .clone()
        .or_else(|| config.search.as_ref().map(|search| search.url.clone()));

    if cli.dry_run {
        handle_dry_run(&config, search_url.as_deref(), &cli)?;
    } else if cli.status {
        handle_status(&config)?;
    } else if cli.export_only {
        handle_export(&config)?;
    } else {
        handle_harvest(config, search_url, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("profile_harvest=info,warn"),
            1 => EnvFilter::new("profile_harvest=debug,info"),
            2 => EnvFilter::new("profile_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, search_url: Option<&str>, cli: &Cli) -> anyhow::Result<()> {
    println!("=== Profile-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Render settle time: {}ms", config.crawler.render_settle_ms);
    println!(
        "  Single-page retries: {} ({}ms apart)",
        config.crawler.extraction_retries, config.crawler.extraction_retry_delay_ms
    );
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);

    println!("\nProfile API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Request delay: {}ms", config.api.request_delay_ms);
    println!("  Timeout: {}s", config.api.timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export directory: {}", config.output.export_dir);

    println!("\n✓ Configuration is valid");

    let stages = Stages::from_cli(cli);
    if stages.crawl {
        let url = resolve_search_url(search_url)?;
        let mode = if cli.single_page {
            "single page"
        } else {
            "every result page"
        };
        println!("✓ Would scrape {} of {}", mode, url);

        if !cli.single_page && !cli.fresh {
            let store = open_store(Path::new(&config.output.database_path))?;
            if let Some(state) = store.load_crawl_state()? {
                if state.resumes(base_url(&url).as_str()) {
                    println!(
                        "✓ Would resume at page {} with {} usernames",
                        state.page,
                        state.identifiers.len()
                    );
                }
            }
        }
    }
    if stages.fetch {
        println!("✓ Would fetch profiles from {}", config.api.base_url);
    }
    if stages.export {
        println!(
            "✓ Would export to {}",
            Path::new(&config.output.export_dir)
                .join(profile_harvest::output::export_filename(Utc::now().date_naive()))
                .display()
        );
    }

    Ok(())
}

/// Handles the --status mode: shows what the database holds
fn handle_status(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-only mode: writes the stored profiles to CSV
fn handle_export(config: &Config) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.output.database_path))?;
    export(config, &store)
}

/// Runs the harvest stages through the coordinator
async fn handle_harvest(config: Config, search_url: Option<String>, cli: &Cli) -> anyhow::Result<()> {
    let stages = Stages::from_cli(cli);

    let start_url = if stages.crawl {
        Some(resolve_search_url(search_url.as_deref())?)
    } else {
        None
    };

    let store = open_store(Path::new(&config.output.database_path))?;
    let pages = HttpPageSource::from_config(&config.crawler, &config.user_agent)?;
    let coordinator = Coordinator::new(&config, pages, store)?;

    let (observer_tx, mut observed) = mpsc::unbounded_channel();
    let (commands, handle) = coordinator.spawn(Reporter::new(observer_tx));

    if let Some(url) = start_url {
        let command = if cli.single_page {
            Message::BeginSinglePageScrape {
                url: url.to_string(),
            }
        } else {
            if cli.fresh {
                tracing::info!("Starting fresh crawl (ignoring saved progress)");
            } else {
                tracing::info!("Starting crawl (will resume an interrupted crawl of this search)");
            }
            Message::BeginMultiPageScrape {
                url: url.to_string(),
                fresh: cli.fresh,
            }
        };

        commands.send(command).await?;
        let found = watch_scrape(&mut observed).await?;

        if found == 0 {
            println!("No profiles found.");
            return Ok(());
        }
    }

    if stages.fetch {
        commands.send(Message::BeginProfileFetch).await?;
        watch_fetch(&mut observed).await?;
    }

    drop(commands);
    let store = handle.await.context("Coordinator task failed")?;

    if stages.export {
        export(&config, &store)?;
    }

    Ok(())
}

/// Prints scrape progress until the scrape finishes; returns the username count
async fn watch_scrape(observed: &mut UnboundedReceiver<Message>) -> anyhow::Result<usize> {
    while let Some(message) = observed.recv().await {
        match message {
            Message::ScrapeProgress { message, .. } => println!("{}", message),
            Message::ScrapeResultsReady {
                identifiers,
                total_pages,
            } => {
                match total_pages {
                    Some(pages) => println!(
                        "Found {} profiles across {} pages",
                        identifiers.len(),
                        pages
                    ),
                    None => println!("Found {} profiles", identifiers.len()),
                }
                return Ok(identifiers.len());
            }
            Message::ScrapeFailed { message, .. } => bail!("{}", message),
            other => tracing::debug!("Ignoring {:?}", other),
        }
    }

    bail!("Coordinator stopped before the scrape finished")
}

/// Prints fetch progress until the batch ends
async fn watch_fetch(observed: &mut UnboundedReceiver<Message>) -> anyhow::Result<()> {
    while let Some(message) = observed.recv().await {
        let Message::FetchUpdate { status } = message else {
            continue;
        };

        match status.phase {
            FetchPhase::Idle | FetchPhase::Progress => {
                tracing::info!("{}", status.message);
            }
            FetchPhase::Complete => {
                println!("{}", status.message);
                return Ok(());
            }
            FetchPhase::Error => bail!("{}", status.message),
        }
    }

    bail!("Coordinator stopped before the fetch finished")
}

fn export<S: StateStore + ?Sized>(config: &Config, store: &S) -> anyhow::Result<()> {
    let profiles = store.load_profiles()?;
    if profiles.is_empty() {
        bail!("No profiles to export. Fetch profiles first.");
    }

    let path = write_export(
        Path::new(&config.output.export_dir),
        &profiles,
        Utc::now().date_naive(),
    )?;
    println!("✓ Exported {} profiles to: {}", profiles.len(), path.display());

    Ok(())
}

fn resolve_search_url(search_url: Option<&str>) -> anyhow::Result<url::Url> {
    let Some(raw) = search_url else {
        bail!("No search URL given. Pass --url or set [search] url in the config.");
    };
    Ok(normalize_search_url(raw)?)
}
