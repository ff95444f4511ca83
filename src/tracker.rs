use crate::analyzer::calculate_stats;
use crate::config::{AppConfig, ExtractionPolicy};
use crate::model::{BookRecord, PriceStats, TrackerError};
use crate::parser::Parser;
use crate::scraper::{Fetcher, PageOutcome, Throttle};
use crate::storage::CsvStore;
use chrono::NaiveDate;
use tracing::info;

/// Outcome of one successful scrape-and-persist run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub pages: u32,
    pub appended: usize,
    pub stats: Option<PriceStats>,
}

/// Walks the catalog page by page and appends the collected batch to the store.
pub struct Tracker<F, P, T> {
    fetcher: F,
    parser: P,
    throttle: T,
    store: CsvStore,
    policy: ExtractionPolicy,
    max_pages: Option<u32>,
}

impl<F: Fetcher, P: Parser, T: Throttle> Tracker<F, P, T> {
    pub fn new(fetcher: F, parser: P, throttle: T, store: CsvStore, config: &AppConfig) -> Self {
        Self {
            fetcher,
            parser,
            throttle,
            store,
            policy: config.extraction_policy,
            max_pages: config.max_pages,
        }
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    /// Collects every record of the catalog, all stamped with `capture_date`.
    /// Any fetch or parse failure aborts the whole scrape.
    pub fn scrape(&self, capture_date: NaiveDate) -> Result<Vec<BookRecord>, TrackerError> {
        self.scrape_pages(capture_date).map(|(records, _)| records)
    }

    fn scrape_pages(&self, capture_date: NaiveDate) -> Result<(Vec<BookRecord>, u32), TrackerError> {
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            if self.max_pages.is_some_and(|max| page > max) {
                info!("Reached page limit ({}), stopping", page - 1);
                break;
            }

            let html = match self
                .fetcher
                .fetch_page(page)
                .map_err(|source| TrackerError::Fetch { page, source })?
            {
                PageOutcome::Page(html) => html,
                PageOutcome::EndOfCatalog => {
                    info!("Page {} not found, catalog exhausted", page);
                    break;
                }
            };

            let books = self
                .parser
                .parse(&html, self.policy)
                .map_err(|source| TrackerError::Parse { page, source })?;
            if books.is_empty() {
                info!("Page {} has no books, catalog exhausted", page);
                break;
            }

            info!("Scraped page {} ({} books)", page, books.len());
            records.extend(books.into_iter().map(|book| book.stamp(capture_date)));
            page += 1;
            self.throttle.pause();
        }

        Ok((records, page - 1))
    }

    /// Scrapes the full catalog, then appends the batch in one go.
    /// Nothing is written when the scrape fails.
    pub fn run(&self, capture_date: NaiveDate) -> Result<RunSummary, TrackerError> {
        let (records, pages) = self.scrape_pages(capture_date)?;
        let appended = self.store.append(&records)?;
        info!(
            "Saved {} books to {}",
            appended,
            self.store.path().display()
        );

        Ok(RunSummary {
            pages,
            appended,
            stats: calculate_stats(&records),
        })
    }
}
