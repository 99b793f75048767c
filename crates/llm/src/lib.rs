//! SkillMaster completion client adapter.
//!
//! Implements the [`pipeline::CompletionClient`] port for the OpenAI Chat
//! Completions API and any OpenAI-compatible endpoint (set
//! [`OpenAiConfig::base_url`]).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response envelope
//! parsing, status classification and exponential back-off all live here. The
//! [`pipeline`] crate sees only [`pipeline::CompletionClient`]. Extracting
//! JSON from the completion text is not this crate's job; it returns the
//! model's text verbatim.

pub mod backoff;
pub mod config;
pub mod openai;

pub use backoff::Backoff;
pub use config::OpenAiConfig;
pub use openai::OpenAiProvider;
