//! Brief to variants: prompt, completion call, parse.

use std::future::Future;

use tracing::{info, warn};

use crate::error::CopyforgeError;
use crate::prompt::build_prompt;
use crate::variants::{CampaignMode, ParsedVariants, parse_variants};

/// A remote service that completes prompts.
pub trait TextGenerator {
    /// Returns the generated text for `prompt`.
    fn generate(&self, prompt: &str)
    -> impl Future<Output = Result<String, CopyforgeError>> + Send;
}

/// Generates up to `limit` variants of `brief`.
///
/// An empty parse is a generation failure; fewer than `limit` variants is
/// returned as-is and visible through [`ParsedVariants::shortfall`].
pub async fn generate_variants<G: TextGenerator + Sync>(
    generator: &G,
    brief: &str,
    mode: CampaignMode,
    limit: usize,
) -> Result<ParsedVariants, CopyforgeError> {
    if brief.trim().is_empty() {
        return Err(CopyforgeError::Precondition(
            "Please enter a marketing brief".to_string(),
        ));
    }
    let prompt = build_prompt(brief, mode, limit);
    let text = generator.generate(&prompt).await?;

    let parsed = parse_variants(&text, mode, limit);
    if parsed.is_empty() {
        return Err(CopyforgeError::Generation(format!(
            "no {mode} variants could be parsed from the generated text"
        )));
    }
    if let Some(missing) = parsed.shortfall() {
        warn!(
            "Only {} of {} {mode} variants were generated ({missing} missing)",
            parsed.len(),
            parsed.requested
        );
    } else {
        info!("Generated {} {mode} variants", parsed.len());
    }
    Ok(parsed)
}
