//! Provider configuration.

use std::time::Duration;

use pipeline::ModelName;

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default timeout for one HTTP exchange. Three attempts fit inside the
/// default 60 s node deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for [`crate::OpenAiProvider`].
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Chat model requested on every call.
    pub model: ModelName,
    /// Sampling temperature, within `0.0..=2.0`.
    pub temperature: f32,
    /// Upper bound on generated tokens. `None` leaves it to the provider.
    pub max_tokens: Option<u32>,
    /// Transport-level timeout for one HTTP exchange.
    pub request_timeout: Duration,
    /// Total attempts per completion, including the first. At least 1.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
}

impl OpenAiConfig {
    /// Configuration for the public OpenAI API with default settings.
    pub fn openai(api_key: impl Into<String>, model: ModelName) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }

    /// Points the configuration at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Splits `budget` evenly across [`Self::max_attempts`] so every retry
    /// can run before the caller's deadline expires.
    ///
    /// Never goes below one second, nor above the budget itself.
    pub fn with_attempt_budget(mut self, budget: Duration) -> Self {
        let share = budget / self.max_attempts.max(1);
        self.request_timeout = share.max(MIN_REQUEST_TIMEOUT).min(budget);
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// The key is never printed.
impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str) -> OpenAiConfig {
        OpenAiConfig::openai(key, DEFAULT_MODEL.parse().unwrap())
    }

    #[test]
    fn defaults_target_openai() {
        let config = config("sk-test");
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.model.as_str(), "gpt-4o-mini");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let config = config("k").with_base_url("http://localhost:11434/v1/");
        assert_eq!(config.completions_url(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn default_attempts_fit_inside_the_node_deadline() {
        let config = config("k");
        assert!(config.request_timeout * config.max_attempts <= Duration::from_secs(60));
    }

    #[test]
    fn attempt_budget_is_shared_between_attempts() {
        let mut config = config("k");
        config.max_attempts = 4;
        let config = config.with_attempt_budget(Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(15));

        let tiny = config.with_attempt_budget(Duration::from_millis(500));
        assert_eq!(tiny.request_timeout, Duration::from_millis(500));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let printed = format!("{:?}", config("sk-secret"));
        assert!(!printed.contains("sk-secret"));
    }
}
