//! OpenAI Chat Completions adapter.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    CompletionClient, CompletionError, CompletionRequest, ResponseFormat, RetryPolicy,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backoff::Backoff;
use crate::config::OpenAiConfig;

/// [`CompletionClient`] backed by an OpenAI-compatible chat endpoint.
///
/// Retryable failures (transport errors, 408, 429, 5xx) are retried up to
/// [`OpenAiConfig::max_attempts`] times with exponential back-off, honouring
/// `Retry-After` when the provider sends it. Everything else is returned on
/// the first occurrence.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    http: reqwest::Client,
    backoff: Backoff,
}

impl OpenAiProvider {
    /// Creates a provider, failing fast on a missing API key.
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::Configuration {
                message: "API key is empty; set OPENAI_API_KEY".into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CompletionError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            backoff: Backoff::new(config.initial_backoff),
            config,
            http,
        })
    }

    /// The settings this provider was built with.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    // -- Request building ----------------------------------------------------

    /// Builds the JSON body for one chat completion.
    pub fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": self.config.model.as_str(),
            "messages": messages,
            "temperature": self.config.temperature,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if request.response_format == ResponseFormat::Json {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }

    fn headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| CompletionError::Configuration {
                message: format!("invalid authorization header: {e}"),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    // -- Transport -----------------------------------------------------------

    async fn send_once(&self, body: &Value) -> Result<String, CompletionError> {
        let url = self.config.completions_url();
        debug!(url = %url, model = %self.config.model, "sending completion request");

        let resp = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport {
                message: e.to_string(),
            })?;

        let status = resp.status();
        let retry_after = parse_retry_after(resp.headers());
        let text = resp.text().await.map_err(|e| CompletionError::Transport {
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                message: error_message(&text),
                retry_after,
            });
        }

        let v: Value =
            serde_json::from_str(&text).map_err(|e| CompletionError::InvalidResponse {
                message: format!("invalid JSON envelope: {e}"),
            })?;
        parse_completion_text(&v)
    }
}

#[async_trait]
impl CompletionClient for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = self.build_request_body(request);
        let max_attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    let policy = err.retry_policy();
                    let after = match policy {
                        RetryPolicy::Retryable { after } if attempt < max_attempts => {
                            after
                        }
                        _ => return Err(err),
                    };
                    let delay = self.backoff.delay(attempt, after);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "completion request failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Extracts `choices[0].message.content` from a chat completion envelope.
pub fn parse_completion_text(v: &Value) -> Result<String, CompletionError> {
    let message = &v["choices"][0]["message"];
    if message.is_null() {
        return Err(CompletionError::InvalidResponse {
            message: "missing `choices[0].message` in response".into(),
        });
    }
    match message["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_owned()),
        _ => {
            let reason = message["refusal"]
                .as_str()
                .map(|r| format!("model refused: {r}"))
                .unwrap_or_else(|| "completion has no text content".into());
            Err(CompletionError::InvalidResponse { message: reason })
        }
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Prefers the provider's `error.message` over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.to_owned())
}
