use crate::config::{AuthMode, SyncConfig};
use crate::record::ProductRecord;
use crate::SyncError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub const META_TITLE_FIELD: &str = "meta_title";
pub const META_DESCRIPTION_FIELD: &str = "meta_description";
pub const LINK_REWRITE_FIELD: &str = "link_rewrite";

/// Reads product records from the webservice and writes patched ones back.
#[derive(Clone)]
pub struct RecordPatcher {
    client: Client,
    config: SyncConfig,
}

/// Builds the HTTP client shared by every request of a run.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> Result<Client, SyncError> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| {
        error!(error = %e, "Failed to create HTTP client");
        SyncError::InvalidConfiguration(format!("Failed to initialize HTTP client: {e}"))
    })
}

impl RecordPatcher {
    pub fn new(config: &SyncConfig, client: Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_mode {
            AuthMode::Basic => request.basic_auth(&self.config.api_key, Some("")),
            AuthMode::QueryKey => request.query(&[("ws_key", self.config.api_key.as_str())]),
        }
    }

    /// Fetches the current record. Anything but 200 is a failure carrying the
    /// response body.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch(&self, product_id: u32) -> Result<ProductRecord, SyncError> {
        let url = self.config.product_url(product_id);
        debug!(url = %url, "Fetching product record");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to send request");
                SyncError::TransportError(e.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        match status {
            StatusCode::OK => ProductRecord::parse(&body),
            StatusCode::NOT_FOUND => Err(SyncError::NotFound {
                product_id,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::AuthError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            _ => Err(SyncError::ReadFailure {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
        }
    }

    pub fn strip_non_writable(record: &mut ProductRecord) -> usize {
        let removed = record.strip_non_writable();
        debug!(removed = removed, "Stripped non-writable fields");
        removed
    }

    /// Writes the three derived fields into every locale and submits the
    /// record.
    #[instrument(level = "debug", skip(self, record), err)]
    pub async fn apply_and_submit(
        &self,
        product_id: u32,
        mut record: ProductRecord,
        meta_title: &str,
        meta_description: &str,
        link_rewrite: &str,
    ) -> Result<(), SyncError> {
        for (field, value) in [
            (META_TITLE_FIELD, meta_title),
            (META_DESCRIPTION_FIELD, meta_description),
            (LINK_REWRITE_FIELD, link_rewrite),
        ] {
            let written = record.set_language_text(field, value);
            debug!(field = field, locales = written, "Applied field value");
        }

        self.submit(product_id, &record).await
    }

    /// Submits the record as is. 200 and 201 count as accepted.
    #[instrument(level = "debug", skip(self, record), err)]
    pub async fn submit(&self, product_id: u32, record: &ProductRecord) -> Result<(), SyncError> {
        let url = self.config.product_url(product_id);
        let payload = record.to_xml()?;

        let response = self
            .authorize(self.client.put(&url))
            .header(CONTENT_TYPE, "application/xml")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to send update");
                SyncError::TransportError(e.to_string())
            })?;

        let status = response.status();
        if matches!(status, StatusCode::OK | StatusCode::CREATED) {
            info!(product_id = product_id, "Product updated successfully");
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, status = status.as_u16(), "Failed to read rejection body");
                String::new()
            }
        };
        Err(SyncError::WriteRejected {
            status: status.as_u16(),
            body,
        })
    }
}
