use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use retrocrawl::config::Config;
use retrocrawl::crawler::{CrawlRequest, HistoricalCrawlController, NewsSite, ProgressReporter};
use retrocrawl::models::{CrawlOutcome, SiteKind};
use retrocrawl::storage::summarize;

/// Run the backward historical crawl until drained or interrupted
pub async fn crawl(
    config: Config,
    site: SiteKind,
    start: Option<NaiveDate>,
    progress: Arc<dyn ProgressReporter>,
) -> Result<()> {
    let controller = build_controller(&config, site, progress)?;

    let request = CrawlRequest {
        start_date: start,
        output_path: config.output_path(site),
        max_empty_days: config.crawler.max_empty_days,
        resume: config.output.resume,
    };

    println!("Starting {} archive crawl", site.display_name());
    println!("==========================");
    println!("Output: {}", request.output_path.display());
    println!("Resume: {}", request.resume);
    println!("Press Ctrl+C to stop after the current day.");
    println!();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping after the current day");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!("Failed to wait for Ctrl+C: {}", e);
            }
        }
    });

    let summary = controller
        .run(&request, shutdown_rx)
        .await
        .with_context(|| format!("Crawl of {site} failed"))?;

    println!();
    println!("Crawl Summary");
    println!("=============");
    match summary.outcome {
        CrawlOutcome::Drained => println!(
            "Stopped after {} consecutive empty days",
            request.max_empty_days
        ),
        CrawlOutcome::Interrupted => println!("Interrupted by user"),
    }
    println!("Started at:      {}", summary.start_date);
    println!("Next date:       {}", summary.next_date);
    println!("Days processed:  {}", summary.days_processed);
    println!("Articles saved:  {}", summary.total_saved);

    Ok(())
}

/// Extract one archive day into a fresh file
pub async fn day(
    config: Config,
    site: SiteKind,
    date: NaiveDate,
    output: Option<PathBuf>,
    progress: Arc<dyn ProgressReporter>,
) -> Result<()> {
    let controller = build_controller(&config, site, progress)?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_{date}.tsv", site.as_str())));

    println!("Extracting {} for {date}", site.display_name());

    let report = controller
        .extract_day(date, &output)
        .await
        .with_context(|| format!("Failed to extract {date}"))?;

    println!(
        "Saved {}/{} articles to {}",
        report.saved,
        report.listed,
        output.display()
    );
    if report.dropped() > 0 {
        println!("  Skipped: {} (no body or fetch failure)", report.dropped());
    }

    Ok(())
}

/// Show what existing output files hold
pub fn stats(paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let mut all = Vec::new();

    for path in &paths {
        if !path.exists() {
            println!("Output not found: {}", path.display());
            continue;
        }
        let stats =
            summarize(path).with_context(|| format!("Failed to read {}", path.display()))?;
        all.push(stats);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    for stats in &all {
        println!("Output Statistics");
        println!("=================");
        println!("File: {}", stats.path.display());
        println!();
        println!("Articles:  {}", stats.rows);
        if stats.malformed > 0 {
            println!("Malformed: {}", stats.malformed);
        }
        match (stats.newest, stats.oldest) {
            (Some(newest), Some(oldest)) => {
                println!("Newest:    {newest}");
                println!("Oldest:    {oldest}");
                if let Some(days) = stats.span_days() {
                    println!("Span:      {days} days");
                }
            }
            _ => println!("No dated rows yet"),
        }
        println!("Sections:  {}", stats.sections.len());
        for (section, count) in &stats.sections {
            println!("  {section:<24} {count}");
        }
        println!();
    }

    Ok(())
}

fn build_controller(
    config: &Config,
    site: SiteKind,
    progress: Arc<dyn ProgressReporter>,
) -> Result<HistoricalCrawlController> {
    let site_config = config.site_config(site);
    let workers = site_config.workers;
    let adapter = NewsSite::new(site_config).context("Failed to create site adapter")?;

    Ok(
        HistoricalCrawlController::new(Arc::new(adapter), config.retry_policy(), workers)
            .with_progress(progress),
    )
}
