use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retrocrawl::config::Config;
use retrocrawl::crawler::{LineProgress, NoopProgress, ProgressReporter, RedrawProgress};
use retrocrawl::models::SiteKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "retrocrawl",
    version,
    about = "Historical news archive crawler with resumable backward day-by-day runs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Progress display while a day is processed
    #[arg(long, global = true, value_enum, default_value_t = ProgressMode::Auto)]
    progress: ProgressMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProgressMode {
    /// When verbose: redraw in place on a terminal, one line per update otherwise
    Auto,
    None,
    Line,
    Redraw,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl an archive backward from a start date until it runs dry
    Crawl {
        /// Site to crawl (correo, peru21)
        #[arg(short, long)]
        site: SiteKind,

        /// Output TSV file (defaults to the site's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First date to crawl when there is nothing to resume from (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Ignore existing output and start a fresh file
        #[arg(long, default_value = "false")]
        no_resume: bool,

        /// Consecutive empty days that end the crawl
        #[arg(long)]
        max_empty_days: Option<u32>,

        /// Concurrent article fetches
        #[arg(short, long)]
        workers: Option<usize>,

        /// Attempts per request
        #[arg(long)]
        max_retries: Option<u32>,

        /// Base retry delay in seconds
        #[arg(long)]
        retry_delay: Option<u64>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Extract a single archive day into a fresh file
    Day {
        /// Site to crawl (correo, peru21)
        #[arg(short, long)]
        site: SiteKind,

        /// Archive date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Output TSV file (defaults to <site>_<date>.tsv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show statistics for existing output files
    Stats {
        /// Output files to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print statistics as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Crawl { config, .. } | Commands::Day { config, .. } => config.clone(),
        Commands::Stats { .. } => None,
    };
    let mut config = load_config(config_path.as_deref())?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    let mode = resolve_progress_mode(cli.progress, cli.verbose, std::io::stderr().is_terminal());
    let redraw = (mode == ProgressMode::Redraw).then(|| Arc::new(RedrawProgress::stderr()));
    setup_tracing(&log_format, &config.logging.level, cli.verbose, redraw.clone())?;

    tracing::info!("retrocrawl starting");

    let progress: Arc<dyn ProgressReporter> = match (mode, redraw) {
        (_, Some(redraw)) => redraw,
        (ProgressMode::Line, None) => Arc::new(LineProgress::stderr()),
        _ => Arc::new(NoopProgress),
    };

    match cli.command {
        Commands::Crawl {
            site,
            output,
            start,
            no_resume,
            max_empty_days,
            workers,
            max_retries,
            retry_delay,
            config: _,
        } => {
            if let Some(output) = output {
                config.output.path = Some(output);
            }
            if no_resume {
                config.output.resume = false;
            }
            if let Some(n) = max_empty_days {
                config.crawler.max_empty_days = n;
            }
            if let Some(n) = workers {
                config.crawler.workers = Some(n);
            }
            if let Some(n) = max_retries {
                config.crawler.max_retries = n;
            }
            if let Some(secs) = retry_delay {
                config.crawler.retry_delay_secs = secs;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(
                site = %site,
                start = ?start,
                resume = config.output.resume,
                max_empty_days = config.crawler.max_empty_days,
                "Starting crawl command"
            );
            commands::crawl(config, site, start, progress).await?;
        }

        Commands::Day {
            site,
            date,
            output,
            config: _,
        } => {
            config.validate().context("Invalid configuration")?;

            tracing::info!(site = %site, date = %date, "Starting day command");
            commands::day(config, site, date, output, progress).await?;
        }

        Commands::Stats { paths, json } => {
            commands::stats(paths, json)?;
        }
    }

    tracing::info!("retrocrawl completed");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

/// Progress is only shown on request or when verbose
fn resolve_progress_mode(mode: ProgressMode, verbose: bool, terminal: bool) -> ProgressMode {
    match mode {
        ProgressMode::Auto if verbose && terminal => ProgressMode::Redraw,
        ProgressMode::Auto if verbose => ProgressMode::Line,
        ProgressMode::Auto => ProgressMode::None,
        other => other,
    }
}

fn setup_tracing(
    format: &str,
    level: &str,
    verbose: bool,
    redraw: Option<Arc<RedrawProgress>>,
) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("retrocrawl=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("retrocrawl={level},warn"))
            .context("Invalid log level")?
    };

    let writer = || match &redraw {
        Some(progress) => {
            let progress = Arc::clone(progress);
            BoxMakeWriter::new(move || progress.log_writer())
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer()))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(writer()))
                .init();
        }
    }

    Ok(())
}
