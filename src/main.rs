//! # Storefront Harvest
//!
//! Command-line front end for the `storefront_harvest` library: classify a
//! pasted list of commerce and news links, then fetch and extract normalized
//! product and article records from them.
//!
//! ## Usage
//!
//! ```sh
//! storefront-harvest parse links.txt
//! storefront-harvest feed https://36kr.com/feed --sort published
//! storefront-harvest -o ./out collect links.txt
//! ```
//!
//! ## Pipeline
//!
//! 1. **Parsing**: normalize, detect and classify every line of the input
//! 2. **Pre-flight**: refuse to start when nothing valid remains, and ask for
//!    `--force` when detection confidence is low
//! 3. **Collection**: fetch (throttled per site, retried on transient
//!    failures), extract and validate every valid entry concurrently
//! 4. **Output**: JSON on stdout, plus a dated file under `--output-dir`
//!
//! Logs go to stderr so stdout stays machine-readable.

use clap::Parser;
use serde::Serialize;
use std::error::Error;
use storefront_harvest::batch::{CollectionCheck, parse_batch, validate_for_collection};
use storefront_harvest::collector::{BatchItemOutcome, BatchReport, Collector, FeedOutcome};
use storefront_harvest::config::CollectorConfig;
use storefront_harvest::fetch::{HtmlFetcher, RetryFetch};
use storefront_harvest::models::sort_records;
use storefront_harvest::outputs::json;
use storefront_harvest::sources::registry;
use storefront_harvest::utils::{ensure_writable_dir, generate_id};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;

use cli::{sort_order, Cli, Command};

type HttpCollector = Collector<RetryFetch<HtmlFetcher>>;

/// Everything the `collect` command produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectRun {
    task_id: String,
    check: CollectionCheck,
    report: BatchReport,
    results: Vec<BatchItemOutcome>,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.global, "Parsed CLI arguments");

    let config = match &args.global.config {
        Some(path) => CollectorConfig::load(path)?,
        None => CollectorConfig::default(),
    };
    let config = args.global.apply(config);
    let output_dir = args.global.output_dir.as_deref();

    // Fail before any network work if results could not be saved.
    if let Some(dir) = output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let task_id = args
        .global
        .task_id
        .clone()
        .unwrap_or_else(|| generate_id("task"));
    info!(%task_id, "storefront-harvest starting");

    match args.command {
        Command::Parse { input } => {
            let text = read_input(&input).await?;
            let result = parse_batch(&text);
            info!(
                total = result.summary.total,
                valid = result.summary.valid,
                invalid = result.summary.invalid,
                "Parsed link list"
            );
            emit(&result, output_dir, &format!("batch_{}", task_id)).await?;
        }

        Command::Article { url } => {
            let collector = build_collector(&config)?;
            let outcome = collector.parse_news_article(&url, &task_id).await;
            emit(&outcome, output_dir, &format!("article_{}", task_id)).await?;
        }

        Command::Product { url } => {
            let collector = build_collector(&config)?;
            let outcome = collector.parse_product(&url, &task_id).await;
            emit(&outcome, output_dir, &format!("product_{}", task_id)).await?;
        }

        Command::Feed { url, sort, asc } => {
            let collector = build_collector(&config)?;
            let mut outcome = collector.parse_rss_feed(&url, &task_id).await;
            if let (FeedOutcome::Success { items, .. }, Some(sort)) = (&mut outcome, sort) {
                sort_records(items, sort.key(), sort_order(asc));
            }
            emit(&outcome, output_dir, &format!("feed_{}", task_id)).await?;
        }

        Command::Collect {
            input,
            force,
            no_throttle,
        } => {
            let text = read_input(&input).await?;
            let parsed = parse_batch(&text);
            for warning in &parsed.warnings {
                warn!(%warning, "Batch review");
            }

            let check = validate_for_collection(&parsed.entries);
            if !check.can_start {
                error!(errors = ?check.errors, "Nothing to collect");
                return Err(check.errors.join("; ").into());
            }
            if !check.warnings.is_empty() && !force {
                for warning in &check.warnings {
                    warn!(%warning, "Pre-flight");
                }
                return Err("pre-flight check raised warnings; review the list or rerun with --force".into());
            }

            let mut collector = build_collector(&config)?;
            if no_throttle {
                collector = collector.unthrottled();
            }
            let results = collector.collect_batch(&parsed.entries, &task_id).await;
            let run = CollectRun {
                report: BatchReport::from_outcomes(&results),
                task_id: task_id.clone(),
                check,
                results,
            };
            info!(
                collected = run.report.collected,
                failed = run.report.failed,
                skipped = run.report.skipped,
                "Collection complete"
            );
            emit(&run, output_dir, &format!("collect_{}", task_id)).await?;
        }

        Command::Sources => {
            for source in registry().list_enabled() {
                println!(
                    "{:<12} {:<10} {:>4}/min  {}",
                    source.id,
                    format!("{:?}", source.kind).to_lowercase(),
                    source.rate_limit,
                    source.name
                );
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

fn build_collector(config: &CollectorConfig) -> Result<HttpCollector, Box<dyn Error>> {
    let fetcher = HtmlFetcher::from_config(config)?;
    let fetcher = RetryFetch::new(fetcher, config.retry_attempts, config.retry_base_delay());
    Ok(Collector::new(fetcher, config.clone())?)
}

/// Read a link list from a file, or from stdin when `input` is `-`.
async fn read_input(input: &str) -> Result<String, Box<dyn Error>> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    match tokio::fs::read_to_string(input).await {
        Ok(text) => Ok(text),
        Err(e) => {
            error!(path = %input, error = %e, "Failed to read input");
            Err(e.into())
        }
    }
}

/// Print `value` as JSON and, when configured, save it under `output_dir`.
async fn emit<T: Serialize>(value: &T, output_dir: Option<&str>, stem: &str) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    if let Some(dir) = output_dir {
        json::write_json(value, dir, stem).await?;
    }
    Ok(())
}
