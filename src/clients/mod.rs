//! HTTP clients for the two remote services.

use std::time::Duration;

use url::Url;

use crate::error::CopyforgeError;

pub mod completion;
pub mod compositor;

pub use completion::CompletionClient;
pub use compositor::CompositorClient;

/// Shared reqwest client with the per-request timeout applied.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, CopyforgeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| CopyforgeError::Configuration(format!("Failed to build HTTP client: {err}")))
}

/// Resolves `path` under `base`, keeping any path prefix the base carries.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, CopyforgeError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    Ok(base.join(path)?)
}
