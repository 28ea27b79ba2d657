//! recipebox - fetch, cache and display a fixed collection of recipes

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipebox_core::{Config, CoreError, HttpRepository};
use render::CacheStatus;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recipebox",
    version,
    about = "Fetch, cache and display a fixed collection of recipes",
    long_about = "Loads every configured recipe document once, caches the whole collection\n\
                  on disk, and serves later runs from that cache without touching the network.\n\
                  \n\
                  Examples:\n\
                    recipebox                        # Show recipes (default)\n\
                    recipebox show --json            # Print the cached/fetched records as JSON\n\
                    recipebox status                 # Inspect the cache without fetching\n\
                    recipebox clear-cache            # Force a refetch on the next run\n\
                    recipebox sources                # List configured source URLs\n\
                  \n\
                  Environment Variables:\n\
                    RECIPEBOX_CONFIG                 # Path to a TOML config file\n\
                    RECIPEBOX_STORAGE_DIR            # Override the cache directory\n\
                    RECIPEBOX_NO_COLOR               # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the cache (default: <data dir>/recipebox)
    #[arg(long, env = "RECIPEBOX_STORAGE_DIR", global = true)]
    storage_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Disable ANSI colors
    #[arg(long, env = "RECIPEBOX_NO_COLOR", global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Load recipes (cache first, network on a miss) and display them (default)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured source URLs
    Sources,
    /// Report cache state without network access
    Status,
    /// Remove the cached collection
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = Some(dir);
    }

    let repository =
        HttpRepository::from_config(&config).context("Failed to set up recipe repository")?;

    match cli.command.unwrap_or(Command::Show { json: false }) {
        Command::Show { json } => run_show(&repository, json, cli.no_color).await,
        Command::Sources => {
            println!("{}", render::format_sources(repository.sources()));
            Ok(())
        }
        Command::Status => run_status(&repository),
        Command::ClearCache => run_clear_cache(&repository).await,
    }
}

/// Logs go to stderr so rendered output on stdout stays clean
fn init_tracing(verbose: bool, no_color: bool) {
    log_subscriber(verbose, no_color, std::io::stderr).init();
}

fn log_subscriber<W>(verbose: bool, no_color: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(writer)
        .with_ansi(!no_color)
        .finish()
}

async fn run_show(repository: &HttpRepository, json: bool, no_color: bool) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start = Instant::now();

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!(
        "Loading {} recipes...",
        repository.sources().len()
    ));

    // A failed load is logged and rendered as nothing, not a hard error
    let records = match repository.get_all().await {
        Ok(records) => {
            spinner.finish_and_clear();
            tracing::info!(
                records = records.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Recipes loaded"
            );
            Some(records)
        }
        Err(e) => {
            spinner.finish_and_clear();
            tracing::error!("Failed to load recipes: {:#}", anyhow::Error::from(e));
            None
        }
    };

    if let Some(output) = render::render_records(records.as_deref(), json, no_color) {
        println!("{}", output);
    }

    Ok(())
}

fn run_status(repository: &HttpRepository) -> Result<()> {
    let path = repository.store().slot_path(repository.cache_key())?;

    let status = match repository.cached() {
        Ok(Some(records)) => CacheStatus::Present {
            records: records.len(),
        },
        Ok(None) => CacheStatus::Absent,
        Err(CoreError::CacheReadFailure { source, .. }) => CacheStatus::Malformed {
            reason: source.to_string(),
        },
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}",
        render::format_status(
            repository.cache_key(),
            &path,
            repository.sources().len(),
            &status
        )
    );
    Ok(())
}

async fn run_clear_cache(repository: &HttpRepository) -> Result<()> {
    let path = repository.store().slot_path(repository.cache_key())?;

    if repository.clear_cache().await? {
        println!("Cache cleared: {}", path.display());
    } else {
        println!("Cache not found at: {}", path.display());
        println!("   Nothing to clear.");
    }

    Ok(())
}
