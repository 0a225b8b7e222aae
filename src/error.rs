use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Failed to scrape product page {url}: status {status}")]
    ScrapeFailure { url: String, status: u16 },

    #[error("Product {product_id} not found: {body}")]
    NotFound { product_id: u32, body: String },

    #[error("Authentication rejected ({status}): {body}")]
    AuthError { status: u16, body: String },

    #[error("Failed to retrieve product ({status}): {body}")]
    ReadFailure { status: u16, body: String },

    #[error("Update rejected ({status}): {body}")]
    WriteRejected { status: u16, body: String },

    #[error("Failed to parse product XML: {0}")]
    XmlParseError(String),

    #[error("Failed to serialize product XML: {0}")]
    XmlWriteError(String),

    #[error("Missing field in product record: {0}")]
    MissingField(String),

    #[error("External service error: {service} - {message}")]
    ExternalServiceError { service: String, message: String },
}

impl SyncError {
    /// HTTP status carried by the error, if the platform answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::ScrapeFailure { status, .. }
            | SyncError::AuthError { status, .. }
            | SyncError::ReadFailure { status, .. }
            | SyncError::WriteRejected { status, .. } => Some(*status),
            SyncError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn log(&self) {
        match self {
            SyncError::InvalidConfiguration(e) => {
                error!(error = %e, "Configuration is invalid");
            }
            SyncError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            SyncError::TransportError(e) => {
                error!(error = %e, "Request could not be completed");
            }
            SyncError::ScrapeFailure { url, status } => {
                warn!(url = %url, status = status, "Failed to retrieve product page");
            }
            SyncError::NotFound { product_id, body } => {
                warn!(product_id = product_id, body = %body, "Product not found");
            }
            SyncError::AuthError { status, body } => {
                error!(status = status, body = %body, "Webservice rejected credentials");
            }
            SyncError::ReadFailure { status, body } => {
                error!(status = status, body = %body, "Failed to retrieve product");
            }
            SyncError::WriteRejected { status, body } => {
                error!(status = status, body = %body, "Failed to update product");
            }
            SyncError::XmlParseError(e) => {
                error!(error = %e, "Product XML could not be parsed");
            }
            SyncError::XmlWriteError(e) => {
                error!(error = %e, "Product XML could not be serialized");
            }
            SyncError::MissingField(field) => {
                warn!(field = %field, "Product record is missing a required field");
            }
            SyncError::ExternalServiceError { service, message } => {
                error!(
                    service = %service,
                    error = %message,
                    "External service error occurred"
                );
            }
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::TransportError(e.to_string())
    }
}
