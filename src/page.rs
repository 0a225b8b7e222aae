use crate::config::ScrapeSelectors;
use crate::utils::normalize_whitespace;
use crate::SyncError;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, instrument, warn};

pub const DESCRIPTION_PLACEHOLDER: &str = "Description not found";
pub const INGREDIENTS_PLACEHOLDER: &str = "Active ingredients not found";
pub const USAGE_PLACEHOLDER: &str = "How to use not found";

/// Text blocks lifted from a product page. Blocks missing from the page hold
/// their placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedContent {
    pub description: String,
    pub ingredients: String,
    pub usage: String,
}

#[derive(Clone)]
pub struct PageScraper {
    client: Client,
    selectors: ScrapeSelectors,
}

impl PageScraper {
    pub fn new(client: Client, selectors: ScrapeSelectors) -> Self {
        Self { client, selectors }
    }

    #[instrument(level = "debug", skip(self), err)]
    pub async fn scrape(&self, url: &str, product_name: &str) -> Result<ScrapedContent, SyncError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, url = %url, "Failed to send page request");
            SyncError::TransportError(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::ScrapeFailure {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        debug!(url = %url, content_length = html.len(), "Fetched product page");

        self.extract(&html, product_name)
    }

    pub fn extract(&self, html: &str, product_name: &str) -> Result<ScrapedContent, SyncError> {
        let document = Html::parse_document(html);

        let description = match self.select_text(&document, &self.selectors.description)? {
            Some(text) => Some(text),
            None => self.find_mentioning(&document, product_name)?,
        };
        let description = description.unwrap_or_else(|| {
            warn!("Description not found on product page");
            DESCRIPTION_PLACEHOLDER.to_string()
        });

        let ingredients = self
            .select_text(&document, &self.selectors.ingredients)?
            .unwrap_or_else(|| {
                warn!("Active ingredients not found on product page");
                INGREDIENTS_PLACEHOLDER.to_string()
            });

        let usage = self
            .select_text(&document, &self.selectors.usage)?
            .unwrap_or_else(|| {
                warn!("How to use not found on product page");
                USAGE_PLACEHOLDER.to_string()
            });

        Ok(ScrapedContent {
            description,
            ingredients,
            usage,
        })
    }

    fn select_text(&self, document: &Html, selector: &str) -> Result<Option<String>, SyncError> {
        let selector = parse_selector(selector)?;
        Ok(document.select(&selector).next().map(element_text))
    }

    // First element of the fallback kind whose own text mentions the product.
    fn find_mentioning(&self, document: &Html, product_name: &str) -> Result<Option<String>, SyncError> {
        if product_name.is_empty() {
            return Ok(None);
        }
        let selector = parse_selector(&self.selectors.description_fallback_tag)?;

        Ok(document
            .select(&selector)
            .find(|el| {
                el.children()
                    .filter_map(|node| node.value().as_text())
                    .any(|text| text.contains(product_name))
            })
            .map(element_text))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SyncError> {
    Selector::parse(selector).map_err(|e| {
        SyncError::InvalidConfiguration(format!("Invalid selector {selector}: {e:?}"))
    })
}

fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
