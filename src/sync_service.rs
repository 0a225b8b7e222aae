use crate::generator::TextGenerator;
use crate::meta::{compute_meta_description, compute_meta_title, link_rewrite, parse_short_description};
use crate::page::PageScraper;
use crate::patcher::{build_client, RecordPatcher};
use crate::{SyncConfig, SyncError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const NAME_FIELD: &str = "name";
const SHORT_DESCRIPTION_FIELD: &str = "description_short";

/// Fields written back for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub product_id: u32,
    pub product_name: String,
    pub meta_title: String,
    pub meta_description: String,
    pub link_rewrite: String,
}

/// Per-product results of a batch, in the order the ids were given.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<(u32, Result<SyncOutcome, SyncError>)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (u32, &SyncError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (*id, e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Runs the fetch, derive and submit pipeline, one product at a time.
pub struct MetaSyncService {
    config: SyncConfig,
    patcher: RecordPatcher,
    scraper: PageScraper,
    generator: Arc<dyn TextGenerator>,
}

impl MetaSyncService {
    pub fn new(config: SyncConfig, generator: Arc<dyn TextGenerator>) -> Result<Self, SyncError> {
        let client = build_client(&config.user_agent, config.timeout)?;
        debug!(generator = generator.name(), "Initializing MetaSyncService");

        Ok(Self {
            patcher: RecordPatcher::new(&config, client.clone()),
            scraper: PageScraper::new(client, config.selectors.clone()),
            config,
            generator,
        })
    }

    #[instrument(level = "info", skip(self), err)]
    pub async fn sync_product(&self, product_id: u32) -> Result<SyncOutcome, SyncError> {
        let mut record = self.patcher.fetch(product_id).await?;
        RecordPatcher::strip_non_writable(&mut record);

        let product_name = record
            .first_language_text(NAME_FIELD)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| SyncError::MissingField(NAME_FIELD.to_string()))?;
        debug!(product_name = %product_name, "Read product name");

        let short_description = record
            .first_language_text(SHORT_DESCRIPTION_FIELD)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| SyncError::MissingField(SHORT_DESCRIPTION_FIELD.to_string()))?;
        let parsed = parse_short_description(&short_description);
        debug!(brand = %parsed.brand, fragment = %parsed.fragment, "Parsed short description");

        let page_url = self.config.product_page_url(product_id);
        let scraped = self.scraper.scrape(&page_url, &product_name).await?;

        let meta_title = compute_meta_title(&parsed.brand, &product_name, &parsed.fragment);
        info!(meta_title = %meta_title, "Generated meta title");

        let meta_description = compute_meta_description(
            self.generator.as_ref(),
            &product_name,
            &scraped.description,
            &scraped.usage,
            &scraped.ingredients,
        )
        .await?;
        info!(meta_description = %meta_description, "Generated meta description");

        let slug = link_rewrite(&product_name);

        self.patcher
            .apply_and_submit(product_id, record, &meta_title, &meta_description, &slug)
            .await?;

        Ok(SyncOutcome {
            product_id,
            product_name,
            meta_title,
            meta_description,
            link_rewrite: slug,
        })
    }

    /// Handles every id to completion before the next. A failing product is
    /// recorded and the batch moves on.
    pub async fn sync_products(&self, product_ids: &[u32]) -> BatchReport {
        let mut report = BatchReport::default();

        for &product_id in product_ids {
            let result = self.sync_product(product_id).await;
            if let Err(e) = &result {
                warn!(product_id = product_id, error = %e, "Product skipped");
                e.log();
            }
            report.results.push((product_id, result));
        }

        info!(
            total = product_ids.len(),
            failed = report.failure_count(),
            "Batch finished"
        );
        report
    }
}
