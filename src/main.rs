mod analyzer;
mod config;
mod model;
mod parser;
mod report;
mod scraper;
mod storage;
mod tracker;
mod utils;

use chrono::Local;
use config::{load_or_default, AppConfig};
use parser::CatalogParser;
use scraper::{FixedDelay, HttpFetcher};
use std::process::ExitCode;
use storage::CsvStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracker::Tracker;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration from file, falling back to built-in defaults
    let config = match load_or_default("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scraped = scrape_and_save(&config);
    if let Err(e) = &scraped {
        error!("❌ {}", e);
    }

    // Reports always re-read the full history, even after a failed run
    let store = CsvStore::new(config.store_path.clone());
    let reported = report::render_history(&store, config.cheapest_limit);
    match &reported {
        Ok(charts) => println!("{}", charts),
        Err(e) => error!("❌ Cannot render reports: {}", e),
    }

    if scraped.is_ok() && reported.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn scrape_and_save(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::new(config)?;
    let parser = CatalogParser::new()?;
    let throttle = FixedDelay::from_config(config);
    let store = CsvStore::new(config.store_path.clone());
    let tracker = Tracker::new(fetcher, parser, throttle, store, config);

    let capture_date = Local::now().date_naive();
    info!("Scraping book data for {}...", capture_date);
    let summary = tracker.run(capture_date)?;
    info!(
        "Run finished: {} pages, {} books appended",
        summary.pages, summary.appended
    );
    if let Some(stats) = &summary.stats {
        info!(
            "Batch stats: avg = {:.2}, std_dev = {:.2}, min = {:.2}, max = {:.2}",
            stats.avg_price, stats.std_dev, stats.min_price, stats.max_price
        );
    }

    Ok(())
}
