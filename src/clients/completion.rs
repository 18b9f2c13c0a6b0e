//! Completion service client.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::cli::ServiceOptions;
use crate::constants::COMPLETIONS_PATH;
use crate::error::CopyforgeError;
use crate::generation::TextGenerator;

/// Request body for POST /v1/completions
#[derive(Serialize, Debug)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Calls the completion endpoint with bearer auth.
#[derive(Clone, Debug)]
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    /// Client for `options`; the key may be missing until the first call.
    pub fn new(options: &ServiceOptions, api_key: Option<String>) -> Result<Self, CopyforgeError> {
        Ok(Self {
            http: super::http_client(options.timeout())?,
            endpoint: super::endpoint(&options.completion_base_url, COMPLETIONS_PATH)?,
            api_key,
            model: options.model.clone(),
            max_tokens: options.max_tokens,
        })
    }

    /// Whether a key is configured.
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends `prompt` and returns the generated text of the first choice.
    pub async fn complete(&self, prompt: &str) -> Result<String, CopyforgeError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CopyforgeError::Configuration("Please provide a Writer API key".to_string())
        })?;

        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
        };
        debug!("Requesting completion from {} with {}", self.endpoint, self.model);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| CopyforgeError::Generation(format!("request failed: {err}")))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| CopyforgeError::Generation(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(CopyforgeError::Generation(format!(
                "completion API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: CompletionResponse = serde_json::from_slice(&bytes).map_err(|err| {
            CopyforgeError::Generation(format!("failed to parse completion JSON: {err}"))
        })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(CopyforgeError::Generation(
                "completion API returned no text".to_string(),
            ));
        }
        Ok(text)
    }
}

impl TextGenerator for CompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, CopyforgeError> {
        self.complete(prompt).await
    }
}
