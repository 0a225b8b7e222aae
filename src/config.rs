//! Process-wide configuration, read once at startup.

use crate::SyncError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u16 = 50;

/// How the webservice key is presented to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// HTTP basic auth, key as username and an empty password
    #[default]
    Basic,
    /// `ws_key` query parameter
    QueryKey,
}

impl AuthMode {
    pub fn parse(value: &str) -> Result<Self, SyncError> {
        match value.trim().to_lowercase().as_str() {
            "basic" => Ok(AuthMode::Basic),
            "query" | "ws_key" => Ok(AuthMode::QueryKey),
            other => Err(SyncError::InvalidConfiguration(format!(
                "Unknown auth mode: {other}. Expected 'basic' or 'query'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u16,
}

/// CSS selectors locating the text blocks on a product page.
#[derive(Debug, Clone)]
pub struct ScrapeSelectors {
    pub description: String,
    /// Elements searched for the product name when `description` matches nothing
    pub description_fallback_tag: String,
    pub ingredients: String,
    pub usage: String,
}

impl Default for ScrapeSelectors {
    fn default() -> Self {
        Self {
            description: "div.shopi_descripton".to_string(),
            description_fallback_tag: "div".to_string(),
            ingredients: "div#showhidetarget4".to_string(),
            usage: "div#showhidetarget6".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Webservice root, including the `/api` segment
    pub api_base_url: String,
    pub api_key: String,
    pub auth_mode: AuthMode,
    /// Customer-facing shop root
    pub shop_base_url: String,
    pub generation: GenerationConfig,
    pub selectors: ScrapeSelectors,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl SyncConfig {
    pub fn new(
        api_base_url: &str,
        api_key: &str,
        shop_base_url: &str,
        generation_api_key: &str,
    ) -> Result<Self, SyncError> {
        if api_key.trim().is_empty() {
            return Err(SyncError::InvalidConfiguration(
                "Webservice API key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: validate_base_url(api_base_url)?,
            api_key: api_key.to_string(),
            auth_mode: AuthMode::default(),
            shop_base_url: validate_base_url(shop_base_url)?,
            generation: GenerationConfig {
                api_key: generation_api_key.to_string(),
                model: DEFAULT_MODEL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
            },
            selectors: ScrapeSelectors::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        })
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                SyncError::InvalidConfiguration(format!("{key} environment variable not set"))
            })
        };

        let api_base_url = required("PRESTASHOP_URL")?;
        let api_key = required("PRESTASHOP_API_KEY")?;
        let shop_base_url = required("SHOP_BASE_URL")?;
        // OPEN_API_KEY is the name older deployments used
        let generation_key = required("OPENAI_API_KEY").or_else(|_| required("OPEN_API_KEY"))?;

        let mut config = Self::new(&api_base_url, &api_key, &shop_base_url, &generation_key)?;

        if let Some(mode) = lookup("PRESTASHOP_AUTH") {
            config.auth_mode = AuthMode::parse(&mode)?;
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.generation.model = model;
        }
        if let Some(max_tokens) = lookup("OPENAI_MAX_TOKENS") {
            config.generation.max_tokens = max_tokens.trim().parse().map_err(|_| {
                SyncError::InvalidConfiguration(format!("Invalid OPENAI_MAX_TOKENS: {max_tokens}"))
            })?;
        }
        if let Some(user_agent) = lookup("HTTP_USER_AGENT").filter(|u| !u.trim().is_empty()) {
            config.user_agent = user_agent;
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SyncError::InvalidConfiguration(format!("Invalid HTTP_TIMEOUT_SECS: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Read and write endpoint of a product record.
    pub fn product_url(&self, product_id: u32) -> String {
        format!("{}/products/{}", self.api_base_url, product_id)
    }

    /// Customer-facing page of a product.
    pub fn product_page_url(&self, product_id: u32) -> String {
        format!(
            "{}/index.php?id_product={}&controller=product",
            self.shop_base_url, product_id
        )
    }
}

fn validate_base_url(raw: &str) -> Result<String, SyncError> {
    let url = Url::parse(raw.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SyncError::InvalidConfiguration(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(SyncError::InvalidConfiguration(format!(
            "No host in URL: {raw}"
        )));
    }

    Ok(raw.trim().trim_end_matches('/').to_string())
}
