//! Core analysis domain for SkillMaster.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, validation rule, and cross-cutting error type used throughout the
//! analysis pipeline. Infrastructure crates implement the traits defined here;
//! they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`SkillName`, `NodeName`, `PipelineRunId`, etc.) |
//! | [`types`] | Shared value types (`ProficiencyLevel`, `Distinction`, `NextStep`, etc.) |
//! | [`errors`] | Error, failure-record, and retry-policy types |
//! | [`validation`] | Cardinality and referential rules for node outputs |
//! | [`context`] | The append-only [`PipelineContext`] |
//! | [`node`] | The [`PipelineNode`] contract |
//! | [`ports`] | The [`CompletionClient`] port |
//! | [`report`] | Boundary request/report shapes |

pub mod context;
pub mod errors;
pub mod identifiers;
pub mod node;
pub mod ports;
pub mod report;
pub mod types;
pub mod validation;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use context::PipelineContext;
pub use errors::{
    CompletionError, ContextError, ErrorKind, NodeError, NodeFailure, ParseError, RetryPolicy,
    SkillMasterError, ValidationError,
};
pub use identifiers::{ModelName, NodeName, PipelineRunId, SkillName};
pub use node::{NodeOutput, PipelineNode};
pub use ports::{CompletionClient, CompletionRequest, ResponseFormat};
pub use report::{AnalysisReport, AnalysisRequest};
pub use types::{
    Distinction, NextStep, NodeRecord, NodeStatus, ProficiencyLevel, Timestamp,
    UnknownProficiencyLevel,
};
