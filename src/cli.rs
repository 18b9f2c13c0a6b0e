//! CLI parser
use clap::{Args, Parser};
use std::num::NonZeroU16;
use std::time::Duration;
use url::Url;

use crate::config::LayerBinding;
use crate::constants::{
    DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL, DEFAULT_COMPOSITOR_BASE_URL,
    DEFAULT_LAYER_BINDINGS, DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_TEMPLATE_ID, DEFAULT_VARIANT_LIMIT,
};

#[derive(Args, Debug, Clone)]
/// Remote service and template options shared by every binary
pub struct ServiceOptions {
    #[arg(long, env = "WRITER_API_KEY", hide_env_values = true)]
    /// Completion service API key. Env: WRITER_API_KEY
    pub writer_api_key: Option<String>,

    #[arg(long, env = "PHOTOROOM_API_KEY", hide_env_values = true)]
    /// Image compositor API key. Env: PHOTOROOM_API_KEY
    pub photoroom_api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_TEMPLATE_ID, env = "COPYFORGE_TEMPLATE_ID")]
    /// Template to render variants onto.
    /// Env: COPYFORGE_TEMPLATE_ID
    pub template_id: String,

    #[arg(
        long = "layer",
        env = "COPYFORGE_LAYERS",
        value_delimiter = ',',
        default_values = DEFAULT_LAYER_BINDINGS
    )]
    /// `slot=layerId` bindings, eg `title=header`. Repeatable or comma separated.
    /// Env: COPYFORGE_LAYERS
    pub layers: Vec<LayerBinding>,

    #[arg(long, default_value = DEFAULT_COMPLETION_BASE_URL, env = "COPYFORGE_COMPLETION_URL")]
    /// Completion service base URL.
    /// Env: COPYFORGE_COMPLETION_URL
    pub completion_base_url: Url,

    #[arg(long, default_value = DEFAULT_COMPOSITOR_BASE_URL, env = "COPYFORGE_COMPOSITOR_URL")]
    /// Image compositor base URL.
    /// Env: COPYFORGE_COMPOSITOR_URL
    pub compositor_base_url: Url,

    #[arg(long, default_value = DEFAULT_COMPLETION_MODEL, env = "COPYFORGE_MODEL")]
    /// Completion model
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    /// Output token cap for a generation call
    pub max_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECONDS, env = "COPYFORGE_TIMEOUT")]
    /// Timeout for every remote call, in seconds
    pub timeout_secs: u64,

    #[arg(
        long,
        default_value_t = DEFAULT_VARIANT_LIMIT,
        value_parser = parse_variant_limit,
        env = "COPYFORGE_VARIANT_LIMIT"
    )]
    /// How many variants to request, and the most that are kept
    pub variant_limit: usize,
}

impl ServiceOptions {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_variant_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value.parse().map_err(|err| format!("{err}"))?;
    if limit == 0 {
        return Err("variant limit must be at least 1".to_string());
    }
    Ok(limit)
}

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "COPYFORGE_DEBUG")]
    /// Enable debug logging. Env: COPYFORGE_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "COPYFORGE_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: COPYFORGE_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "COPYFORGE_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: COPYFORGE_LISTEN_ADDRESS
    pub listen_address: String,

    #[command(flatten)]
    /// Remote service options
    pub service: ServiceOptions,
}
