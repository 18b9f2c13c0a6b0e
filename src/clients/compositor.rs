//! Image compositor client.

use reqwest::multipart::Form;
use tracing::debug;
use url::Url;

use crate::batch::{CompositeRequest, Compositor, FailureReason};
use crate::cli::ServiceOptions;
use crate::constants::{COMPOSITOR_EDIT_PATH, TEMPLATE_ID_FIELD, X_API_KEY, layer_text_field};
use crate::error::CopyforgeError;

/// Posts template edits as multipart forms, authenticated with `x-api-key`.
#[derive(Clone, Debug)]
pub struct CompositorClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl CompositorClient {
    /// Client for `options`; the key may be missing until the first render.
    pub fn new(options: &ServiceOptions, api_key: Option<String>) -> Result<Self, CopyforgeError> {
        Ok(Self {
            http: super::http_client(options.timeout())?,
            endpoint: super::endpoint(&options.compositor_base_url, COMPOSITOR_EDIT_PATH)?,
            api_key,
        })
    }

    fn form_for(request: &CompositeRequest) -> Form {
        request.layers.iter().fold(
            Form::new().text(TEMPLATE_ID_FIELD, request.template_id.clone()),
            |form, layer| form.text(layer_text_field(&layer.layer_id), layer.text.clone()),
        )
    }
}

impl Compositor for CompositorClient {
    async fn render(&self, request: &CompositeRequest) -> Result<Vec<u8>, FailureReason> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FailureReason::Transport("no PhotoRoom API key configured".into()))?;
        debug!(
            "Posting {} layer(s) for template {} to {}",
            request.layers.len(),
            request.template_id,
            self.endpoint
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(X_API_KEY, api_key)
            .multipart(Self::form_for(request))
            .send()
            .await
            .map_err(|err| FailureReason::Transport(err.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| FailureReason::Transport(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(FailureReason::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}
