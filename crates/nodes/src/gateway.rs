//! The LLM gateway: the single path every node uses to reach the model.
//!
//! Wraps the injected [`CompletionClient`] with the per-call deadline and the
//! one-shot stricter-prompt retry for unparsable responses. Network retries
//! are the client's business and never happen here.

use std::sync::Arc;
use std::time::Duration;

use pipeline::{CompletionClient, CompletionRequest, NodeError, NodeName};
use serde_json::Value;
use tracing::{debug, warn};

use crate::parser::parse_response;
use crate::prompts::{STRICT_JSON_REMINDER, SYSTEM_PROMPT};
use crate::ExecutorConfig;

/// Shared handle to the completion client plus call policy.
#[derive(Clone)]
pub struct LlmGateway {
    client: Arc<dyn CompletionClient>,
    call_timeout: Duration,
    parse_retry: bool,
}

impl LlmGateway {
    /// Creates a gateway over `client` using the limits in `config`.
    pub fn new(client: Arc<dyn CompletionClient>, config: &ExecutorConfig) -> Self {
        Self {
            client,
            call_timeout: config.node_timeout,
            parse_retry: config.parse_retry,
        }
    }

    /// Sends `prompt` on behalf of `node` and returns the extracted JSON.
    ///
    /// When the first response holds no JSON and parse retry is enabled, the
    /// prompt is re-sent once with [`STRICT_JSON_REMINDER`] appended.
    pub async fn request_json(&self, node: &NodeName, prompt: String) -> Result<Value, NodeError> {
        let request = CompletionRequest::json(prompt).with_system(SYSTEM_PROMPT);
        let raw = self.call(node, &request).await?;

        match parse_response(&raw) {
            Ok(value) => Ok(value),
            Err(err) if self.parse_retry => {
                warn!(
                    node = %node,
                    reason = %err.reason,
                    "model response held no JSON; retrying with stricter prompt"
                );
                let strict = CompletionRequest {
                    prompt: format!("{}\n\n{}", request.prompt, STRICT_JSON_REMINDER),
                    ..request
                };
                let raw = self.call(node, &strict).await?;
                Ok(parse_response(&raw)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn call(&self, node: &NodeName, request: &CompletionRequest) -> Result<String, NodeError> {
        debug!(node = %node, prompt_len = request.prompt.len(), "sending completion request");
        match tokio::time::timeout(self.call_timeout, self.client.complete(request)).await {
            Ok(Ok(text)) => {
                debug!(node = %node, response_len = text.len(), "received completion");
                Ok(text)
            }
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(NodeError::Timeout {
                after: self.call_timeout,
            }),
        }
    }
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("call_timeout", &self.call_timeout)
            .field("parse_retry", &self.parse_retry)
            .finish_non_exhaustive()
    }
}
