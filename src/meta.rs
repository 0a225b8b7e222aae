//! Derivation of the SEO fields written back to a product.

use crate::generator::TextGenerator;
use crate::utils::{drop_last_chars, skip_chars, title_case};
use crate::SyncError;
use tracing::{debug, instrument, warn};

/// Width of the label that opens a short description (`<p>`).
pub const LABEL_PREFIX_LEN: usize = 3;
/// Width of the token that closes a short description (`</p>`).
pub const SUFFIX_TOKEN_LEN: usize = 4;

/// Brand and description fragment carried by a short description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortDescription {
    pub brand: String,
    pub fragment: String,
    /// Whether the `-` separator was present
    pub separated: bool,
}

/// Splits a short description laid out as
/// `{label}{brand} - {fragment}{suffix}` on its first `-`.
///
/// The label is [`LABEL_PREFIX_LEN`] characters wide and the suffix
/// [`SUFFIX_TOKEN_LEN`]; both are cut by position, not by content, so any
/// input that does not follow this layout yields garbage rather than an
/// error. Parts shorter than their offset become empty. Without a separator
/// the whole trimmed input is the fragment and the brand is empty.
pub fn parse_short_description(raw: &str) -> ShortDescription {
    match raw.split_once('-') {
        Some((left, right)) => ShortDescription {
            brand: skip_chars(left.trim(), LABEL_PREFIX_LEN).to_string(),
            fragment: drop_last_chars(right.trim(), SUFFIX_TOKEN_LEN).to_string(),
            separated: true,
        },
        None => {
            warn!(short_description = %raw, "No brand separator in short description");
            ShortDescription {
                brand: String::new(),
                fragment: raw.trim().to_string(),
                separated: false,
            }
        }
    }
}

pub fn compute_meta_title(brand: &str, product_name: &str, fragment: &str) -> String {
    format!(
        "{} {} - {}",
        title_case(brand),
        title_case(product_name),
        title_case(fragment)
    )
}

/// URL slug of a product: lower-cased name with spaces turned into dashes.
pub fn link_rewrite(product_name: &str) -> String {
    product_name.to_lowercase().replace(' ', "-")
}

pub fn meta_description_prompt(
    product_name: &str,
    description: &str,
    usage: &str,
    ingredients: &str,
) -> String {
    format!(
        "Write an SEO meta description for the following product: {product_name}. \
         product description: {description} how to use: {usage} ingredients: {ingredients}, \
         and output only the description max 160 characters."
    )
}

/// Asks the generator for a meta description. The 160 character limit is
/// only requested in the prompt, the answer is not checked against it.
#[instrument(level = "debug", skip_all, fields(generator = generator.name()), err)]
pub async fn compute_meta_description(
    generator: &dyn TextGenerator,
    product_name: &str,
    description: &str,
    usage: &str,
    ingredients: &str,
) -> Result<String, SyncError> {
    let prompt = meta_description_prompt(product_name, description, usage, ingredients);
    let generated = generator.generate(prompt).await?;
    let meta_description = generated.trim().to_string();
    debug!(
        length = meta_description.chars().count(),
        "Generated meta description"
    );
    Ok(meta_description)
}
