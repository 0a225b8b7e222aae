mod config;
mod error;
mod generator;
#[cfg(feature = "logging")]
mod logging;
mod meta;
mod page;
mod patcher;
mod record;
mod sync_service;
mod utils;

pub use config::{
    AuthMode, GenerationConfig, ScrapeSelectors, SyncConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_USER_AGENT,
};
pub use error::SyncError;
#[cfg(feature = "llm")]
pub use generator::openai::OpenAIGenerator;
pub use generator::{MockGenerator, TextGenerator};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_sync_card, setup_logging, LogConfig};
pub use meta::{
    compute_meta_description, compute_meta_title, link_rewrite, meta_description_prompt,
    parse_short_description, ShortDescription, LABEL_PREFIX_LEN, SUFFIX_TOKEN_LEN,
};
pub use page::{
    PageScraper, ScrapedContent, DESCRIPTION_PLACEHOLDER, INGREDIENTS_PLACEHOLDER,
    USAGE_PLACEHOLDER,
};
pub use patcher::{
    build_client, RecordPatcher, LINK_REWRITE_FIELD, META_DESCRIPTION_FIELD, META_TITLE_FIELD,
};
pub use record::{ProductRecord, NON_WRITABLE_FIELDS};
pub use sync_service::{BatchReport, MetaSyncService, SyncOutcome};
pub use utils::{title_case, truncate_str};
