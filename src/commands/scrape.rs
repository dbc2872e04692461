//! Scrape command: walks listing pages and collects reviews.

use crate::config::Config;
use crate::reviews::{Extractor, PageFetcher, ReviewClient, ReviewRecord};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Builds the URL of a 1-based listing page.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        return base_url.to_string();
    }

    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, separator, page)
}

/// Outcome of a scraping run.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Reviews from all pages, in page then document order
    pub reviews: Vec<ReviewRecord>,
    /// Pages that were requested
    pub pages_visited: u32,
    /// Pages whose fetch failed
    pub failed_pages: Vec<u32>,
    /// Containers skipped because of extraction errors
    pub skipped_containers: usize,
}

/// Executes a multi-page review scrape.
pub struct ScrapeCommand {
    config: Config,
    extractor: Extractor,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        let extractor = Extractor::from_config(&config);
        Self { config, extractor }
    }

    /// Scrapes reviews starting at `base_url`.
    pub async fn execute(&self, base_url: &str) -> Result<ScrapeReport> {
        let client =
            ReviewClient::new(&self.config).await.context("Failed to create HTTP client")?;

        let report = self.execute_with_fetcher(&client, base_url).await;
        debug!("Issued {} requests", client.request_count());
        Ok(report)
    }

    /// Scrapes reviews with a provided fetcher (for testing).
    pub async fn execute_with_fetcher(
        &self,
        fetcher: &impl PageFetcher,
        base_url: &str,
    ) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        for page in 1..=self.config.max_pages {
            let url = page_url(base_url, page);
            info!("Scraping page {}: {}", page, url);
            report.pages_visited += 1;

            let html = match fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch page {}: {}", page, e);
                    report.failed_pages.push(page);
                    continue;
                }
            };

            let extraction = self.extractor.extract(&html);
            report.skipped_containers += extraction.skipped.len();

            if extraction.is_empty() {
                info!("No reviews found on page {}", page);
                if page > 1 {
                    debug!("Empty page {}, assuming end of reviews", page);
                    break;
                }
                continue;
            }

            info!("Found {} reviews on page {}", extraction.count(), page);
            report.reviews.extend(extraction.records);
        }

        info!("Total reviews scraped: {}", report.reviews.len());
        report
    }
}
