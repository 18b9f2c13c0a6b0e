//! Shared constants/defaults for things
//!

/// Demo template used when no template is configured
pub const DEFAULT_TEMPLATE_ID: &str = "ab19c9f6-235a-4ee5-9397-16baa4f705a1";

/// Default `slot=layerId` bindings for the demo template
pub const DEFAULT_LAYER_BINDINGS: [&str; 3] = ["title=header", "header=header", "cta=cta"];

/// Default completion service base URL
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.writer.com";

/// Completion endpoint, relative to the completion base URL
pub const COMPLETIONS_PATH: &str = "v1/completions";

/// Default completion model
pub const DEFAULT_COMPLETION_MODEL: &str = "palmyra-x-003-instruct";

/// Default output token cap for one completion call
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default image compositor base URL
pub const DEFAULT_COMPOSITOR_BASE_URL: &str = "https://image-api.photoroom.com";

/// Template edit endpoint, relative to the compositor base URL
pub const COMPOSITOR_EDIT_PATH: &str = "v2/edit";

/// Header carrying the compositor credential
pub const X_API_KEY: &str = "x-api-key";

/// Multipart field naming the template to render
pub const TEMPLATE_ID_FIELD: &str = "templateId";

/// Timeout (in seconds) applied to every remote call.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default number of variants requested (and kept) per generation.
pub const DEFAULT_VARIANT_LIMIT: usize = 10;

/// Browser session inactivity timeout (in minutes).
pub const SESSION_INACTIVITY_MINUTES: i64 = 60;

/// Returns the multipart field name for a template text layer.
pub fn layer_text_field(layer_id: &str) -> String {
    format!("layers.{layer_id}.text.content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_field_names_follow_compositor_format() {
        assert_eq!(layer_text_field("header"), "layers.header.text.content");
    }
}
