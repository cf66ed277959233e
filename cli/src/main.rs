use anyhow::Result;
use clap::Parser;
use ptfood_core::cache::open_cache;
use ptfood_core::config::Settings;
use ptfood_core::fetch::{CachedClient, ItemFetcher, ReqwestClient};
use ptfood_core::output::OutputTarget;
use ptfood_core::{categorize_items, load_items, PercentReport};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "ptfood",
    version = "0.1.0",
    about = "Build PeriodicTable food category data from item ID lists",
    long_about = None
)]
struct Cli {
    /// One or more files containing comma-separated item IDs
    #[arg(value_name = "FILE", required = true)]
    files: Vec<std::path::PathBuf>,

    /// Output file, defaults to stdout
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// Path to TOML settings file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Path to SQLite response cache (overrides the settings file)
    #[arg(long)]
    cache_db: Option<std::path::PathBuf>,

    /// Keep responses in memory only for this run
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Path to log file
    #[arg(long, default_value = "/tmp/ptfood.log")]
    log_file: std::path::PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match (quiet, verbose) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(std::path::Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("ptfood.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Settings file not found: {:?}", path);
            }
            Settings::from_file(path)?
        }
        None => Settings::default(),
    }
    .with_cache_path(cli.cache_db.clone());

    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;

    info!("Starting ptfood");

    for file in &cli.files {
        if !file.exists() {
            anyhow::bail!("Item ID file not found: {:?}", file);
        }
    }

    let settings = load_settings(&cli)?;
    let cache = open_cache(&settings.cache_backend(cli.no_cache), settings.cache_ttl()?)?;
    let client = CachedClient::new(ReqwestClient::new(&settings)?, cache);
    let fetcher = ItemFetcher::new(client, settings.item_url_template.clone());

    let items = load_items(&fetcher, &cli.files)?;
    info!("Parsed {} food items from {} files", items.len(), cli.files.len());

    let (categorized, percent_items) = categorize_items(&items);
    info!("Sorted items into {} categories", categorized.len());

    OutputTarget::from_arg(cli.output).write(&categorized)?;

    PercentReport::new(&percent_items).log();

    info!("ptfood finished");
    Ok(())
}
