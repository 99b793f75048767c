//! Port traits implemented by infrastructure crates.
//!
//! The domain never talks to a model provider directly. It builds a
//! [`CompletionRequest`] and hands it to whatever [`CompletionClient`] the
//! composition root injected (the OpenAI adapter in `llm`, or a scripted mock
//! in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CompletionError;

/// Output format requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text.
    Text,
    /// A single JSON document.
    Json,
}

/// One prompt sent to a completion client.
///
/// Serialises as `{"prompt", "response_format": "json", "system"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The user prompt.
    pub prompt: String,
    /// The requested output format.
    pub response_format: ResponseFormat,
    /// Optional system instruction sent ahead of the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl CompletionRequest {
    /// Creates a request for a JSON response.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_format: ResponseFormat::Json,
            system: None,
        }
    }

    /// Attaches a system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A text-generation service.
///
/// Implementations own transport, authentication, and retry/back-off. They
/// return the raw completion text; extracting structure from it is the
/// caller's job.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `request` and returns the model's raw text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
