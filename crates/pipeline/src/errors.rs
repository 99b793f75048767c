//! Error, failure-record, and retry-policy types for the SkillMaster domain.
//!
//! The layering mirrors where each failure originates:
//!
//! | Type | Produced by |
//! |------|-------------|
//! | [`CompletionError`] | completion client adapters |
//! | [`ParseError`] | the response parser |
//! | [`ValidationError`] | the domain rules in [`crate::validation`] |
//! | [`NodeError`] | a pipeline node (wraps all of the above) |
//! | [`ContextError`] | illegal writes or status transitions on the context |
//! | [`SkillMasterError`] | request boundaries and composition roots |
//!
//! Every [`NodeError`] is classified by an [`ErrorKind`] and, when it halts a
//! run, recorded in the context as a serialisable [`NodeFailure`].
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NodeName, NodeStatus};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by [`CompletionError::retry_policy`] so adapters can decide
/// whether to re-issue a request without failing the node.
///
/// - `Retryable` errors: transport failures, request timeouts, rate limits,
///   server-side errors.
/// - `NonRetryable` errors: bad credentials, malformed requests, malformed
///   response envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from a `Retry-After` response header).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryPolicy::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classification of a node failure, as reported at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid credentials or settings.
    Configuration,
    /// The completion call failed after the adapter's retries.
    Network,
    /// The completion call exceeded the per-node deadline.
    Timeout,
    /// No JSON could be extracted from the model's response.
    Parse,
    /// JSON was extracted but violates a shape, count, or reference rule.
    Validation,
    /// The run was cancelled by its caller.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Parse => "parse",
            ErrorKind::Validation => "validation",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Structured record of the node failure that halted a run.
///
/// Serialises as `{"failed_node", "error_kind", "message"}`, the error shape
/// returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
    /// Name of the node that failed.
    pub failed_node: NodeName,
    /// Classification of the failure.
    pub error_kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl NodeFailure {
    /// Builds the failure record for `error` raised by `node`.
    pub fn from_error(node: NodeName, error: &NodeError) -> Self {
        Self {
            failed_node: node,
            error_kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed ({}): {}", self.failed_node, self.error_kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// Completion client errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a [`crate::CompletionClient`] implementation.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// Credentials or client settings are missing or rejected.
    #[error("completion client misconfigured: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
        /// Delay requested by the provider, if any.
        retry_after: Option<Duration>,
    },

    /// The request never produced a response (connect failure, reset, client
    /// side timeout).
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider answered, but the envelope did not contain completion text.
    #[error("invalid provider response: {message}")]
    InvalidResponse {
        /// Description of what was missing or malformed.
        message: String,
    },
}

impl CompletionError {
    /// Whether the failed request may be re-issued.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            CompletionError::Http {
                status,
                retry_after,
                ..
            } if *status == 408 || *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            CompletionError::Transport { .. } => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// The response parser could not extract any JSON value from model output.
///
/// Carries the raw text so callers can tell "nothing usable" apart from a
/// well-formed but empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no JSON value found in model response ({reason})")]
pub struct ParseError {
    /// The model output exactly as received.
    pub raw: String,
    /// Why the last extraction attempt failed.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Parsed data violates a cardinality, shape, or referential rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The list for `field` has the wrong number of entries.
    #[error("expected exactly {expected} {field}, got {actual}")]
    WrongCount {
        /// Context field being validated.
        field: &'static str,
        /// Required number of entries.
        expected: usize,
        /// Number of entries received.
        actual: usize,
    },

    /// A required text field is absent or blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Path of the offending field (e.g. `distinctions[2].name`).
        field: String,
    },

    /// The payload does not have the expected structure.
    #[error("{field} has an unexpected shape: {message}")]
    Shape {
        /// Context field being validated.
        field: &'static str,
        /// Deserialisation detail.
        message: String,
    },

    /// Two distinctions share a name, which would make `develops` ambiguous.
    #[error("duplicate distinction name '{name}'")]
    DuplicateDistinction {
        /// The repeated name.
        name: String,
    },

    /// A next step references a distinction that does not exist.
    #[error("next_steps[{step}] develops unknown distinction '{name}'")]
    UnknownDistinction {
        /// Index of the offending next step.
        step: usize,
        /// The unresolved name.
        name: String,
    },

    /// A next step does not develop any distinction.
    #[error("next_steps[{step}] must develop at least one distinction")]
    NothingDeveloped {
        /// Index of the offending next step.
        step: usize,
    },

    /// The output cannot be committed: its field is already written or its
    /// upstream fields are still empty.
    #[error("output rejected by context: {reason}")]
    Rejected {
        /// The context's reason for refusing the write.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Node errors
// ---------------------------------------------------------------------------

/// Errors a pipeline node may return from `execute`.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// The completion client is misconfigured.
    #[error("completion client misconfigured: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The completion call failed.
    #[error("completion request failed: {0}")]
    Network(CompletionError),

    /// The completion call did not resolve within the node deadline.
    #[error("completion request timed out after {after:?}")]
    Timeout {
        /// The deadline that was exceeded.
        after: Duration,
    },

    /// The model response contained no extractable JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The model response was JSON but violated a domain rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The run was cancelled while this node was executing.
    #[error("run cancelled by caller")]
    Cancelled,
}

impl NodeError {
    /// Classifies this error for the failure record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodeError::Configuration { .. } => ErrorKind::Configuration,
            NodeError::Network(_) => ErrorKind::Network,
            NodeError::Timeout { .. } => ErrorKind::Timeout,
            NodeError::Parse(_) => ErrorKind::Parse,
            NodeError::Validation(_) => ErrorKind::Validation,
            NodeError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<CompletionError> for NodeError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Configuration { message } => NodeError::Configuration { message },
            CompletionError::Http { status, message, .. } if status == 401 || status == 403 => {
                NodeError::Configuration {
                    message: format!("provider rejected credentials (HTTP {status}): {message}"),
                }
            }
            other => NodeError::Network(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Context errors
// ---------------------------------------------------------------------------

/// Illegal operations on a [`crate::PipelineContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The field already holds a value; fields are written exactly once.
    #[error("context field '{field}' has already been written")]
    AlreadyWritten {
        /// The field that was written twice.
        field: &'static str,
    },

    /// A field was written before the fields it depends on.
    #[error("context field '{field}' requires '{requires}' to be populated first")]
    MissingUpstream {
        /// The field being written.
        field: &'static str,
        /// The empty upstream field.
        requires: &'static str,
    },

    /// The node is not registered with this context.
    #[error("node '{node}' is not registered")]
    UnknownNode {
        /// The unregistered node.
        node: NodeName,
    },

    /// The node is registered twice.
    #[error("node '{node}' is already registered")]
    DuplicateNode {
        /// The repeated node.
        node: NodeName,
    },

    /// The requested status change is not an edge of the node state machine.
    #[error("node '{node}' cannot move from {from} to {to}")]
    InvalidTransition {
        /// The node whose status was being changed.
        node: NodeName,
        /// Current status.
        from: NodeStatus,
        /// Requested status.
        to: NodeStatus,
    },

    /// Data supplied to rebuild a context violates a domain rule.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// Boundary errors
// ---------------------------------------------------------------------------

/// Errors surfaced at request boundaries (CLI, HTTP) and composition roots.
#[derive(Debug, Error)]
pub enum SkillMasterError {
    /// The inbound request is invalid; no node has run.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// The offending request field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The runtime configuration is invalid.
    ///
    /// Produced at start-up; no pipeline runs with an invalid configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A node failed and the run halted.
    #[error("pipeline halted: {0}")]
    Halted(NodeFailure),

    /// The context rejected an operation.
    #[error(transparent)]
    Context(#[from] ContextError),
}
